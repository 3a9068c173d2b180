//! Custom Assertions
//!
//! Assertions over invoice collections with failure messages that name the
//! offending invoice.

use std::collections::HashSet;

use core_kernel::{Money, ProjectId};
use domain_billing::{Invoice, InvoiceStatus, PaymentPlan};

/// Asserts that `after` starts with exactly the manual invoices of `before`,
/// in the same order and unmodified
///
/// # Panics
///
/// Panics if a manual invoice was dropped, reordered or edited.
pub fn assert_manual_preserved(before: &[Invoice], after: &[Invoice]) {
    let expected: Vec<&Invoice> = before.iter().filter(|i| i.is_manual()).collect();
    let actual: Vec<&Invoice> = after.iter().filter(|i| i.is_manual()).collect();
    assert_eq!(
        actual, expected,
        "Manual invoices changed during reconciliation"
    );
    assert!(
        after
            .iter()
            .take(expected.len())
            .all(Invoice::is_manual),
        "Manual invoices must precede generated ones"
    );
}

/// Asserts that no two invoices share an id
pub fn assert_unique_ids(invoices: &[Invoice]) {
    let mut seen = HashSet::new();
    for invoice in invoices {
        assert!(
            seen.insert(&invoice.id),
            "Duplicate invoice id {}",
            invoice.id
        );
    }
}

/// Asserts that a generated invoice bills exactly one period of `plan`
pub fn assert_bills_plan(invoice: &Invoice, plan: &PaymentPlan) {
    assert!(
        invoice.is_subscription(),
        "Invoice {} is not a subscription invoice",
        invoice.id
    );
    assert_eq!(invoice.items.len(), 1, "Invoice {} has {} items", invoice.id, invoice.items.len());
    assert_eq!(invoice.items[0].description, plan.line_description());
    assert_eq!(invoice.currency, plan.currency);
    assert_eq!(
        invoice.total(),
        Money::new(plan.price, plan.currency),
        "Invoice {} total does not match plan {}",
        invoice.id,
        plan.id
    );
}

/// Returns the subscription invoices of one project, in collection order
pub fn invoices_for_project<'a>(invoices: &'a [Invoice], project_id: &str) -> Vec<&'a Invoice> {
    let project_id = ProjectId::new(project_id);
    invoices
        .iter()
        .filter(|i| i.is_subscription() && i.project_id.as_ref() == Some(&project_id))
        .collect()
}

/// Asserts the statuses of a project's subscription invoices, oldest first
pub fn assert_project_statuses(invoices: &[Invoice], project_id: &str, expected: &[InvoiceStatus]) {
    let mut generated = invoices_for_project(invoices, project_id);
    generated.sort_by_key(|i| i.issue_date);
    let statuses: Vec<InvoiceStatus> = generated.iter().map(|i| i.status).collect();
    assert_eq!(
        statuses, expected,
        "Unexpected statuses for project {}",
        project_id
    );
}
