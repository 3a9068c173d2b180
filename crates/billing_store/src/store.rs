//! The billing store
//!
//! `BillingStore` is the single owner of billing state. Every mutation goes
//! through one write path:
//!
//! 1. take the writer lock
//! 2. apply the change to a working copy
//! 3. reconcile subscription invoices if projects or plans changed
//! 4. save through the persistence port, if one is configured
//! 5. publish the new snapshot to subscribers
//!
//! A failed validation or save leaves the published state untouched.
//! Changes that produce an identical snapshot are neither saved nor published.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument};

use core_kernel::{Clock, ClientId, InvoiceId, PlanId, ProjectId, SystemClock, Timezone};
use domain_billing::{
    BillingError, Client, Invoice, InvoiceKind, PaymentPlan, Project, Reconciler,
};

use crate::ports::SnapshotPort;
use crate::snapshot::BillingSnapshot;

/// Whether a mutation touches reconciliation inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Effect {
    Plain,
    Reconcile,
}

/// Summary of an explicit reconciliation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// True when the invoice collection was replaced
    pub changed: bool,
    /// Subscription invoices after the run
    pub subscription_invoices: usize,
    /// Active projects whose plan did not resolve
    pub unresolved_plans: Vec<ProjectId>,
}

/// Single-writer container for clients, projects, plans and invoices
pub struct BillingStore {
    state: Mutex<BillingSnapshot>,
    published: watch::Sender<Arc<BillingSnapshot>>,
    reconciler: Reconciler,
    clock: Arc<dyn Clock>,
    port: Option<Arc<dyn SnapshotPort>>,
}

impl std::fmt::Debug for BillingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingStore")
            .field("reconciler", &self.reconciler)
            .field("persistent", &self.port.is_some())
            .finish_non_exhaustive()
    }
}

impl BillingStore {
    pub fn builder() -> BillingStoreBuilder {
        BillingStoreBuilder::default()
    }

    /// Returns the current read-only snapshot
    pub fn snapshot(&self) -> Arc<BillingSnapshot> {
        self.published.borrow().clone()
    }

    /// Subscribes to snapshot changes
    ///
    /// The receiver starts at the current snapshot and is notified after
    /// every committed change.
    pub fn subscribe(&self) -> watch::Receiver<Arc<BillingSnapshot>> {
        self.published.subscribe()
    }

    // ------------------------------------------------------------------
    // Clients
    // ------------------------------------------------------------------

    /// Creates or replaces a client
    #[instrument(skip(self, client), fields(client_id = %client.id))]
    pub async fn upsert_client(&self, client: Client) -> Result<Arc<BillingSnapshot>, BillingError> {
        self.commit(|state| {
            upsert_by(&mut state.clients, client, |c| c.id.clone());
            Ok(Effect::Plain)
        })
        .await
    }

    /// Removes a client that no longer owns projects
    #[instrument(skip(self))]
    pub async fn remove_client(&self, id: &ClientId) -> Result<Arc<BillingSnapshot>, BillingError> {
        self.commit(|state| {
            if state.client(id).is_none() {
                return Err(BillingError::ClientNotFound(id.to_string()));
            }
            let projects = state.projects_for_client(id).count();
            if projects > 0 {
                return Err(BillingError::ClientInUse {
                    client_id: id.to_string(),
                    projects,
                });
            }
            state.clients.retain(|c| &c.id != id);
            Ok(Effect::Plain)
        })
        .await
    }

    // ------------------------------------------------------------------
    // Projects and plans (reconciliation inputs)
    // ------------------------------------------------------------------

    /// Creates or replaces a project and reconciles
    ///
    /// The owning client must exist. The plan id is not checked: a project
    /// bound to an unknown plan simply bills nothing.
    #[instrument(skip(self, project), fields(project_id = %project.id))]
    pub async fn upsert_project(&self, project: Project) -> Result<Arc<BillingSnapshot>, BillingError> {
        self.commit(|state| {
            if state.client(&project.client_id).is_none() {
                return Err(BillingError::ClientNotFound(project.client_id.to_string()));
            }
            upsert_by(&mut state.projects, project, |p| p.id.clone());
            Ok(Effect::Reconcile)
        })
        .await
    }

    /// Removes a project and reconciles away its subscription invoices
    #[instrument(skip(self))]
    pub async fn remove_project(&self, id: &ProjectId) -> Result<Arc<BillingSnapshot>, BillingError> {
        self.commit(|state| {
            if state.project(id).is_none() {
                return Err(BillingError::ProjectNotFound(id.to_string()));
            }
            state.projects.retain(|p| &p.id != id);
            Ok(Effect::Reconcile)
        })
        .await
    }

    /// Creates or replaces a payment plan and reconciles
    #[instrument(skip(self, plan), fields(plan_id = %plan.id))]
    pub async fn upsert_plan(&self, plan: PaymentPlan) -> Result<Arc<BillingSnapshot>, BillingError> {
        plan.validate()?;
        self.commit(|state| {
            upsert_by(&mut state.payment_plans, plan, |p| p.id.clone());
            Ok(Effect::Reconcile)
        })
        .await
    }

    /// Removes a payment plan and reconciles
    #[instrument(skip(self))]
    pub async fn remove_plan(&self, id: &PlanId) -> Result<Arc<BillingSnapshot>, BillingError> {
        self.commit(|state| {
            if state.plan(id).is_none() {
                return Err(BillingError::PlanNotFound(id.to_string()));
            }
            state.payment_plans.retain(|p| &p.id != id);
            Ok(Effect::Reconcile)
        })
        .await
    }

    // ------------------------------------------------------------------
    // Invoices
    // ------------------------------------------------------------------

    /// Records a new manual invoice under a freshly generated id
    #[instrument(skip(self, invoice), fields(invoice_number = %invoice.invoice_number))]
    pub async fn create_manual_invoice(&self, mut invoice: Invoice) -> Result<Invoice, BillingError> {
        invoice.id = InvoiceId::generate();
        invoice.kind = InvoiceKind::Manual;
        invoice.validate()?;

        let created = invoice.clone();
        self.commit(|state| {
            check_manual_invoice(state, &invoice)?;
            state.invoices.push(invoice);
            Ok(Effect::Plain)
        })
        .await?;
        Ok(created)
    }

    /// Replaces an existing manual invoice
    #[instrument(skip(self, invoice), fields(invoice_id = %invoice.id))]
    pub async fn update_manual_invoice(&self, mut invoice: Invoice) -> Result<Arc<BillingSnapshot>, BillingError> {
        invoice.kind = InvoiceKind::Manual;
        invoice.validate()?;

        self.commit(|state| {
            let position = manual_position(state, &invoice.id)?;
            check_manual_invoice(state, &invoice)?;
            state.invoices[position] = invoice;
            Ok(Effect::Plain)
        })
        .await
    }

    /// Deletes a manual invoice
    #[instrument(skip(self))]
    pub async fn remove_manual_invoice(&self, id: &InvoiceId) -> Result<Arc<BillingSnapshot>, BillingError> {
        self.commit(|state| {
            let position = manual_position(state, id)?;
            state.invoices.remove(position);
            Ok(Effect::Plain)
        })
        .await
    }

    /// Marks any invoice paid
    ///
    /// For subscription invoices this is the one edit reconciliation keeps.
    #[instrument(skip(self))]
    pub async fn mark_invoice_paid(&self, id: &InvoiceId) -> Result<Arc<BillingSnapshot>, BillingError> {
        self.commit(|state| {
            let invoice = state
                .invoices
                .iter_mut()
                .find(|i| &i.id == id)
                .ok_or_else(|| BillingError::InvoiceNotFound(id.to_string()))?;
            invoice.mark_paid();
            Ok(Effect::Plain)
        })
        .await
    }

    // ------------------------------------------------------------------
    // Reconciliation
    // ------------------------------------------------------------------

    /// Reconciles as of the store clock
    pub async fn reconcile(&self) -> Result<ReconcileReport, BillingError> {
        let now = self.clock.now();
        self.reconcile_at(now).await
    }

    /// Reconciles as of `now`
    #[instrument(skip(self))]
    pub async fn reconcile_at(&self, now: DateTime<Utc>) -> Result<ReconcileReport, BillingError> {
        let mut state = self.state.lock().await;
        let pass = self
            .reconciler
            .reconcile(&state.invoices, &state.projects, &state.payment_plans, now);
        let mut report = ReconcileReport {
            changed: pass.is_changed(),
            subscription_invoices: pass.subscription_invoices,
            unresolved_plans: pass.unresolved_plans.clone(),
        };
        if !report.changed {
            return Ok(report);
        }

        let mut next = state.clone();
        let previous = std::mem::take(&mut next.invoices);
        next.invoices = pass.into_invoices(previous);
        report.changed = self.persist_and_publish(&mut state, next).await?;
        Ok(report)
    }

    async fn commit<F>(&self, mutation: F) -> Result<Arc<BillingSnapshot>, BillingError>
    where
        F: FnOnce(&mut BillingSnapshot) -> Result<Effect, BillingError>,
    {
        let mut state = self.state.lock().await;
        let mut next = state.clone();

        if mutation(&mut next)? == Effect::Reconcile {
            let pass = self.reconciler.reconcile(
                &next.invoices,
                &next.projects,
                &next.payment_plans,
                self.clock.now(),
            );
            let previous = std::mem::take(&mut next.invoices);
            next.invoices = pass.into_invoices(previous);
        }

        self.persist_and_publish(&mut state, next).await?;
        Ok(self.snapshot())
    }

    /// Saves and publishes `next` unless it equals the current state
    async fn persist_and_publish(
        &self,
        state: &mut BillingSnapshot,
        next: BillingSnapshot,
    ) -> Result<bool, BillingError> {
        if *state == next {
            debug!("No changes to commit");
            return Ok(false);
        }
        if let Some(port) = &self.port {
            port.save(&next).await?;
            info!(
                clients = next.clients.len(),
                projects = next.projects.len(),
                invoices = next.invoices.len(),
                "Billing snapshot saved"
            );
        }
        *state = next;
        self.published.send_replace(Arc::new(state.clone()));
        Ok(true)
    }
}

/// Builder for [`BillingStore`]
#[derive(Default)]
pub struct BillingStoreBuilder {
    snapshot: Option<BillingSnapshot>,
    clock: Option<Arc<dyn Clock>>,
    timezone: Timezone,
    port: Option<Arc<dyn SnapshotPort>>,
}

impl BillingStoreBuilder {
    /// Initial state, used when no port is set or the port holds nothing
    pub fn snapshot(mut self, snapshot: BillingSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Business timezone for issue and due dates
    pub fn timezone(mut self, timezone: Timezone) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn port(mut self, port: Arc<dyn SnapshotPort>) -> Self {
        self.port = Some(port);
        self
    }

    /// Builds the store from the configured snapshot without touching the port
    pub fn build(self) -> BillingStore {
        let snapshot = self.snapshot.unwrap_or_default();
        let (published, _) = watch::channel(Arc::new(snapshot.clone()));
        BillingStore {
            state: Mutex::new(snapshot),
            published,
            reconciler: Reconciler::new(self.timezone),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            port: self.port,
        }
    }

    /// Loads state from the port, then builds the store
    pub async fn load(mut self) -> Result<BillingStore, BillingError> {
        if let Some(port) = &self.port {
            if let Some(saved) = port.load().await? {
                debug!(
                    invoices = saved.invoices.len(),
                    "Loaded billing snapshot"
                );
                self.snapshot = Some(saved);
            }
        }
        Ok(self.build())
    }
}

/// Replaces the element with the same key, or appends
fn upsert_by<T, K, F>(items: &mut Vec<T>, item: T, key: F)
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let wanted = key(&item);
    match items.iter().position(|existing| key(existing) == wanted) {
        Some(position) => items[position] = item,
        None => items.push(item),
    }
}

fn manual_position(state: &BillingSnapshot, id: &InvoiceId) -> Result<usize, BillingError> {
    let position = state
        .invoices
        .iter()
        .position(|i| &i.id == id)
        .ok_or_else(|| BillingError::InvoiceNotFound(id.to_string()))?;
    if !state.invoices[position].is_manual() {
        return Err(BillingError::NotManualInvoice(id.to_string()));
    }
    Ok(position)
}

fn check_manual_invoice(state: &BillingSnapshot, invoice: &Invoice) -> Result<(), BillingError> {
    if state.client(&invoice.client_id).is_none() {
        return Err(BillingError::ClientNotFound(invoice.client_id.to_string()));
    }
    let number_taken = state
        .invoices
        .iter()
        .any(|i| i.id != invoice.id && i.invoice_number == invoice.invoice_number);
    if number_taken {
        return Err(BillingError::DuplicateInvoiceNumber(invoice.invoice_number.clone()));
    }
    Ok(())
}
