//! Subscription invoice reconciliation
//!
//! Recomputes, from the current projects and payment plans, the complete set
//! of subscription invoices that should exist at a given instant.
//!
//! # Rules
//!
//! - Manual invoices pass through verbatim and in their original order.
//! - Subscription invoices are regenerated from scratch on every pass. Ids
//!   are derived from project and issue date, so a period always maps to the
//!   same invoice.
//! - A period is billed once its issue date has begun. Periods are annual
//!   anniversaries of the project's start date.
//! - A billed period is `Pending`, becomes `Overdue` once its due date has
//!   begun, and stays `Paid` once a previous pass recorded it as paid.
//! - A project whose plan id does not resolve is skipped. The skip is
//!   reported in [`Reconciliation::unresolved_plans`] but never fails the pass.
//!
//! # Example
//!
//! ```rust,ignore
//! let reconciler = Reconciler::default();
//! let pass = reconciler.reconcile(&invoices, &projects, &plans, clock.now());
//! if pass.is_changed() {
//!     invoices = pass.into_invoices(invoices);
//!     persist(&invoices)?;
//! }
//! ```

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use core_kernel::temporal::{add_days, anniversary};
use core_kernel::{InvoiceId, PlanId, ProjectId, Timezone};

use crate::invoice::{
    Invoice, InvoiceItem, InvoiceKind, InvoiceStatus, SUBSCRIPTION_PAYMENT_TERMS_DAYS,
};
use crate::plan::PaymentPlan;
use crate::project::Project;

/// Result of comparing the recomputed collection with the previous one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The previous collection is already up to date
    Unchanged,
    /// The collection that replaces the previous one
    Changed(Vec<Invoice>),
}

/// Output of one reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub outcome: ReconcileOutcome,
    /// Active projects skipped because their plan id did not resolve
    pub unresolved_plans: Vec<ProjectId>,
    /// Number of subscription invoices in the recomputed collection
    pub subscription_invoices: usize,
}

impl Reconciliation {
    pub fn is_changed(&self) -> bool {
        matches!(self.outcome, ReconcileOutcome::Changed(_))
    }

    /// Returns the collection to keep: `previous` when unchanged, otherwise
    /// the recomputed one
    pub fn into_invoices(self, previous: Vec<Invoice>) -> Vec<Invoice> {
        match self.outcome {
            ReconcileOutcome::Unchanged => previous,
            ReconcileOutcome::Changed(invoices) => invoices,
        }
    }
}

/// Computes subscription invoices against a business timezone
///
/// The timezone decides the instant at which an issue or due date begins.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    timezone: Timezone,
}

impl Reconciler {
    pub fn new(timezone: Timezone) -> Self {
        Self { timezone }
    }

    pub fn timezone(&self) -> Timezone {
        self.timezone
    }

    /// Runs one reconciliation pass
    ///
    /// # Arguments
    ///
    /// * `previous` - The full current invoice collection
    /// * `projects` - All projects; only those with a plan and start date bill
    /// * `plans` - All payment plans
    /// * `now` - The instant to reconcile at
    #[instrument(skip_all, fields(previous = previous.len(), projects = projects.len(), %now))]
    pub fn reconcile(
        &self,
        previous: &[Invoice],
        projects: &[Project],
        plans: &[PaymentPlan],
        now: DateTime<Utc>,
    ) -> Reconciliation {
        let plans_by_id: HashMap<&PlanId, &PaymentPlan> =
            plans.iter().map(|plan| (&plan.id, plan)).collect();
        let recorded = recorded_statuses(previous);

        let mut candidate: Vec<Invoice> = previous
            .iter()
            .filter(|invoice| invoice.is_manual())
            .cloned()
            .collect();
        let manual_count = candidate.len();
        let mut unresolved_plans = Vec::new();

        for project in projects {
            let Some((plan_id, start)) = project.subscription() else {
                continue;
            };
            let Some(plan) = plans_by_id.get(plan_id) else {
                warn!(
                    project_id = %project.id,
                    plan_id = %plan_id,
                    "Project references an unknown payment plan; no invoices generated"
                );
                unresolved_plans.push(project.id.clone());
                continue;
            };

            for issue_date in billing_periods(start, now, self.timezone) {
                let Ok(due_date) = add_days(issue_date, SUBSCRIPTION_PAYMENT_TERMS_DAYS) else {
                    warn!(project_id = %project.id, %issue_date, "Due date out of range");
                    break;
                };

                let status = match recorded.get(&(&project.id, issue_date)) {
                    Some(InvoiceStatus::Paid) => InvoiceStatus::Paid,
                    _ if self.timezone.has_begun(due_date, now) => InvoiceStatus::Overdue,
                    _ => InvoiceStatus::Pending,
                };

                candidate.push(subscription_invoice(project, plan, issue_date, due_date, status));
            }
        }

        let subscription_invoices = candidate.len() - manual_count;
        let outcome = if same_invoices(previous, &candidate) {
            ReconcileOutcome::Unchanged
        } else {
            ReconcileOutcome::Changed(candidate)
        };

        debug!(
            subscription_invoices,
            unresolved = unresolved_plans.len(),
            changed = matches!(outcome, ReconcileOutcome::Changed(_)),
            "Reconciled subscription invoices"
        );

        Reconciliation {
            outcome,
            unresolved_plans,
            subscription_invoices,
        }
    }
}

/// Reconciles in UTC and returns the collection to keep
pub fn reconcile_invoices(
    previous: Vec<Invoice>,
    projects: &[Project],
    plans: &[PaymentPlan],
    now: DateTime<Utc>,
) -> Vec<Invoice> {
    Reconciler::default()
        .reconcile(&previous, projects, plans, now)
        .into_invoices(previous)
}

/// Issue dates of the annual billing periods that have begun at `now`
pub fn billing_periods(start: NaiveDate, now: DateTime<Utc>, timezone: Timezone) -> BillingPeriods {
    BillingPeriods {
        start,
        now,
        timezone,
        next_year: 0,
        done: false,
    }
}

/// Iterator over annual issue dates, see [`billing_periods`]
#[derive(Debug, Clone)]
pub struct BillingPeriods {
    start: NaiveDate,
    now: DateTime<Utc>,
    timezone: Timezone,
    next_year: u32,
    done: bool,
}

impl Iterator for BillingPeriods {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.done {
            return None;
        }
        match anniversary(self.start, self.next_year) {
            Some(issue_date) if self.timezone.has_begun(issue_date, self.now) => {
                self.next_year += 1;
                Some(issue_date)
            }
            _ => {
                self.done = true;
                None
            }
        }
    }
}

/// Stable invoice id for a project period
pub fn subscription_invoice_id(project_id: &ProjectId, issue_date: NaiveDate) -> InvoiceId {
    InvoiceId::new(format!("inv-{}-{}", project_id, issue_date.format("%Y-%m-%d")))
}

/// Human-readable number for a project period
pub fn subscription_invoice_number(project_id: &ProjectId, issue_date: NaiveDate) -> String {
    format!(
        "SUB-{}-{}",
        project_id.as_str().to_uppercase(),
        issue_date.format("%Y%m")
    )
}

fn subscription_invoice(
    project: &Project,
    plan: &PaymentPlan,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    status: InvoiceStatus,
) -> Invoice {
    Invoice {
        id: subscription_invoice_id(&project.id, issue_date),
        invoice_number: subscription_invoice_number(&project.id, issue_date),
        client_id: project.client_id.clone(),
        project_id: Some(project.id.clone()),
        issue_date,
        due_date,
        items: vec![InvoiceItem::new(plan.line_description(), Decimal::ONE, plan.price)],
        status,
        kind: InvoiceKind::Subscription,
        currency: plan.currency,
    }
}

/// Status of the first subscription invoice recorded per project period
fn recorded_statuses(previous: &[Invoice]) -> HashMap<(&ProjectId, NaiveDate), InvoiceStatus> {
    let mut recorded = HashMap::new();
    for invoice in previous.iter().filter(|invoice| invoice.is_subscription()) {
        if let Some(project_id) = &invoice.project_id {
            recorded
                .entry((project_id, invoice.issue_date))
                .or_insert(invoice.status);
        }
    }
    recorded
}

/// Structural equality of two collections, ignoring order
fn same_invoices(previous: &[Invoice], candidate: &[Invoice]) -> bool {
    if previous.len() != candidate.len() {
        return false;
    }
    let mut left: Vec<&Invoice> = previous.iter().collect();
    let mut right: Vec<&Invoice> = candidate.iter().collect();
    left.sort_by(|a, b| a.id.cmp(&b.id));
    right.sort_by(|a, b| a.id.cmp(&b.id));
    left == right
}
