//! Billing Domain - Clients, Plans, and Subscription Invoicing
//!
//! This crate holds the entities of the billing console and the rule that
//! keeps subscription invoices in step with projects and payment plans.
//!
//! # Invoice ownership
//!
//! - **Manual** invoices are written by users and pass through
//!   reconciliation untouched.
//! - **Subscription** invoices are owned by the [`Reconciler`]: one per
//!   annual billing period of every project bound to a plan. Users may only
//!   mark them paid, and paid status survives every later pass.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{Reconciler, Project, PaymentPlan};
//!
//! let plan = PaymentPlan::new("pro".into(), "Pro", dec!(1200), Currency::EUR);
//! let project = Project::new("p1".into(), "c1".into())
//!     .subscribed(plan.id.clone(), start_date);
//!
//! let pass = Reconciler::default().reconcile(&invoices, &[project], &[plan], now);
//! let invoices = pass.into_invoices(invoices);
//! ```

pub mod client;
pub mod project;
pub mod plan;
pub mod invoice;
pub mod reconcile;
pub mod error;

pub use client::Client;
pub use project::Project;
pub use plan::PaymentPlan;
pub use invoice::{Invoice, InvoiceItem, InvoiceKind, InvoiceStatus, SUBSCRIPTION_PAYMENT_TERMS_DAYS};
pub use reconcile::{
    billing_periods, reconcile_invoices, ReconcileOutcome, Reconciler, Reconciliation,
};
pub use error::BillingError;
