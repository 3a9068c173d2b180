//! Property-based Test Generators
//!
//! Proptest strategies for billing entities. Generated ids are drawn from
//! small pools so collisions between projects, plans and invoices occur.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{ClientId, Currency, InvoiceId, PlanId, ProjectId};
use domain_billing::{Invoice, InvoiceItem, InvoiceKind, InvoiceStatus, PaymentPlan, Project};

/// Strategy for dates between 2018-01-01 and roughly 2025-06
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..2700i64).prop_map(|days| {
        NaiveDate::from_ymd_opt(2018, 1, 1).unwrap_or_default() + Duration::days(days)
    })
}

/// Strategy for instants between 2018-01-01 and roughly 2026-03
pub fn instant_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..(3000 * 24)).prop_map(|hours| {
        Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_default()
            + Duration::hours(hours)
    })
}

/// Strategy for non-negative prices with two decimal places
pub fn price_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::JPY),
    ]
}

pub fn status_strategy() -> impl Strategy<Value = InvoiceStatus> {
    prop_oneof![
        Just(InvoiceStatus::Pending),
        Just(InvoiceStatus::Paid),
        Just(InvoiceStatus::Overdue),
    ]
}

/// Strategy for plans pl0..pl3
pub fn plan_strategy() -> impl Strategy<Value = PaymentPlan> {
    (0u8..4, "[A-Z][a-z]{2,8}", price_strategy(), currency_strategy()).prop_map(
        |(n, name, price, currency)| {
            PaymentPlan::new(PlanId::new(format!("pl{n}")), name, price, currency)
        },
    )
}

/// Strategy for projects p0..p5, some unbilled and some on unknown plans
pub fn project_strategy() -> impl Strategy<Value = Project> {
    (
        0u8..6,
        0u8..3,
        proptest::option::of(0u8..6),
        proptest::option::of(date_strategy()),
    )
        .prop_map(|(n, client, plan, start)| Project {
            id: ProjectId::new(format!("p{n}")),
            client_id: ClientId::new(format!("c{client}")),
            name: None,
            plan_id: plan.map(|p| PlanId::new(format!("pl{p}"))),
            start_date: start,
        })
}

/// Strategy for user-authored manual invoices
pub fn manual_invoice_strategy() -> impl Strategy<Value = Invoice> {
    (
        any::<u32>(),
        date_strategy(),
        0i64..60,
        status_strategy(),
        currency_strategy(),
        price_strategy(),
        proptest::option::of(0u8..6),
    )
        .prop_map(|(n, issue, terms, status, currency, price, project)| {
            let mut invoice = Invoice::manual(
                InvoiceId::new(format!("m-{n}")),
                format!("INV-{n:08}"),
                ClientId::new("c0"),
                issue,
                issue + Duration::days(terms),
                currency,
            )
            .with_item(InvoiceItem::new("Work", Decimal::ONE, price));
            invoice.status = status;
            invoice.project_id = project.map(|p| ProjectId::new(format!("p{p}")));
            invoice
        })
}

/// Strategy for stored subscription invoices, possibly stale or paid
pub fn subscription_invoice_strategy() -> impl Strategy<Value = Invoice> {
    (manual_invoice_strategy(), 0u8..6).prop_map(|(mut invoice, project)| {
        let project_id = ProjectId::new(format!("p{project}"));
        invoice.id = InvoiceId::new(format!(
            "inv-{}-{}",
            project_id,
            invoice.issue_date.format("%Y-%m-%d")
        ));
        invoice.project_id = Some(project_id);
        invoice.kind = InvoiceKind::Subscription;
        invoice
    })
}

/// Strategy for a mixed previous invoice collection
pub fn invoices_strategy() -> impl Strategy<Value = Vec<Invoice>> {
    proptest::collection::vec(
        prop_oneof![manual_invoice_strategy(), subscription_invoice_strategy()],
        0..8,
    )
}
