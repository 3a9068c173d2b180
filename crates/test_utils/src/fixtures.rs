//! Pre-built Test Fixtures
//!
//! Ready-to-use billing data. Fixtures are fixed and predictable so tests can
//! assert exact ids, dates and totals.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;

use core_kernel::{ClientId, Currency, PlanId, ProjectId, Timezone};
use domain_billing::{Client, PaymentPlan, Project};

/// Fixture for clients
pub struct ClientFixtures;

impl ClientFixtures {
    /// Primary client used by most scenarios
    pub fn acme() -> Client {
        Client::new(ClientId::new("c1"), "Acme")
            .with_email("billing@acme.test")
            .with_company("Acme Corp")
    }

    /// A second client for cross-client scenarios
    pub fn globex() -> Client {
        Client::new(ClientId::new("c2"), "Globex")
    }
}

/// Fixture for payment plans
pub struct PlanFixtures;

impl PlanFixtures {
    /// 1200.00 EUR per year
    pub fn pro() -> PaymentPlan {
        PaymentPlan::new(PlanId::new("pl1"), "Pro", dec!(1200.00), Currency::EUR)
    }

    /// 300.00 USD per year
    pub fn starter() -> PaymentPlan {
        PaymentPlan::new(PlanId::new("pl2"), "Starter", dec!(300.00), Currency::USD)
    }

    /// Zero-priced plan
    pub fn free() -> PaymentPlan {
        PaymentPlan::new(PlanId::new("pl0"), "Free", dec!(0), Currency::USD)
    }
}

/// Fixture for projects
pub struct ProjectFixtures;

impl ProjectFixtures {
    /// Project p1 of client c1 on the Pro plan since 2022-01-10
    pub fn subscribed() -> Project {
        Project::new(ProjectId::new("p1"), ClientId::new("c1"))
            .with_name("Website")
            .subscribed(PlanId::new("pl1"), DateFixtures::subscription_start())
    }

    /// Project p2 of client c1 with no plan
    pub fn unbilled() -> Project {
        Project::new(ProjectId::new("p2"), ClientId::new("c1")).with_name("Internal")
    }

    /// Project p3 of client c1 bound to a plan that does not exist
    pub fn dangling_plan() -> Project {
        Project::new(ProjectId::new("p3"), ClientId::new("c1"))
            .subscribed(PlanId::new("missing"), DateFixtures::subscription_start())
    }
}

/// Fixture for dates and instants
pub struct DateFixtures;

impl DateFixtures {
    /// Start date of the standard subscription
    pub fn subscription_start() -> NaiveDate {
        date(2022, 1, 10)
    }

    /// 2024-06-01T00:00:00Z: three periods billed, first two overdue
    pub fn reconcile_instant() -> DateTime<Utc> {
        instant(2024, 6, 1, 0)
    }

    /// 2024-01-20T12:00:00Z: third period billed and still pending
    pub fn within_payment_terms() -> DateTime<Utc> {
        instant(2024, 1, 20, 12)
    }

    pub fn berlin() -> Timezone {
        Timezone::new(chrono_tz::Europe::Berlin)
    }
}

/// Shorthand for a calendar date
///
/// # Panics
///
/// Panics on an invalid date; intended for literals in tests.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

/// Shorthand for a UTC instant on the hour
///
/// # Panics
///
/// Panics on an invalid date or hour.
pub fn instant(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .expect("valid fixture instant")
}
