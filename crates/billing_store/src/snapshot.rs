//! Billing snapshots
//!
//! A snapshot is the complete, immutable state of the console at one point:
//! every client, project, payment plan and invoice. The store publishes a new
//! snapshot after each committed change; readers never see partial updates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use core_kernel::{ClientId, Currency, InvoiceId, Money, MoneyError, PlanId, ProjectId};
use domain_billing::{Client, Invoice, PaymentPlan, Project};

/// The full billing state
///
/// Serialized with the console's collection names so existing saved data
/// loads unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingSnapshot {
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub payment_plans: Vec<PaymentPlan>,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
}

impl BillingSnapshot {
    pub fn client(&self, id: &ClientId) -> Option<&Client> {
        self.clients.iter().find(|c| &c.id == id)
    }

    pub fn project(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| &p.id == id)
    }

    pub fn plan(&self, id: &PlanId) -> Option<&PaymentPlan> {
        self.payment_plans.iter().find(|p| &p.id == id)
    }

    pub fn invoice(&self, id: &InvoiceId) -> Option<&Invoice> {
        self.invoices.iter().find(|i| &i.id == id)
    }

    /// Projects owned by a client
    pub fn projects_for_client<'a>(
        &'a self,
        client_id: &'a ClientId,
    ) -> impl Iterator<Item = &'a Project> + 'a {
        self.projects.iter().filter(move |p| &p.client_id == client_id)
    }

    /// Invoices billed to a client, manual and generated
    pub fn invoices_for_client<'a>(
        &'a self,
        client_id: &'a ClientId,
    ) -> impl Iterator<Item = &'a Invoice> + 'a {
        self.invoices.iter().filter(move |i| &i.client_id == client_id)
    }

    pub fn manual_invoices(&self) -> impl Iterator<Item = &Invoice> {
        self.invoices.iter().filter(|i| i.is_manual())
    }

    pub fn subscription_invoices(&self) -> impl Iterator<Item = &Invoice> {
        self.invoices.iter().filter(|i| i.is_subscription())
    }

    /// Unpaid totals for a client, one entry per invoice currency
    pub fn outstanding_by_currency(
        &self,
        client_id: &ClientId,
    ) -> Result<BTreeMap<Currency, Money>, MoneyError> {
        let mut outstanding: BTreeMap<Currency, Money> = BTreeMap::new();
        for invoice in self.invoices_for_client(client_id).filter(|i| !i.is_paid()) {
            let total = invoice.total();
            let entry = outstanding
                .entry(invoice.currency)
                .or_insert_with(|| Money::zero(invoice.currency));
            *entry = entry.checked_add(&total)?;
        }
        Ok(outstanding)
    }
}
