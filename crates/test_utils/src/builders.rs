//! Test Data Builders
//!
//! Fluent builders with sensible defaults, so a test only spells out the
//! fields it cares about.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{ClientId, Currency, InvoiceId, PlanId, ProjectId};
use domain_billing::{Invoice, InvoiceItem, InvoiceKind, InvoiceStatus, PaymentPlan, Project};

use crate::fixtures::date;

/// Builder for projects
pub struct ProjectBuilder {
    id: ProjectId,
    client_id: ClientId,
    name: Option<String>,
    plan_id: Option<PlanId>,
    start_date: Option<NaiveDate>,
}

impl Default for ProjectBuilder {
    fn default() -> Self {
        Self {
            id: ProjectId::new("p1"),
            client_id: ClientId::new("c1"),
            name: None,
            plan_id: None,
            start_date: None,
        }
    }
}

impl ProjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = ProjectId::new(id);
        self
    }

    pub fn with_client(mut self, client_id: &str) -> Self {
        self.client_id = ClientId::new(client_id);
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn on_plan(mut self, plan: &PaymentPlan) -> Self {
        self.plan_id = Some(plan.id.clone());
        self
    }

    pub fn on_plan_id(mut self, plan_id: &str) -> Self {
        self.plan_id = Some(PlanId::new(plan_id));
        self
    }

    pub fn starting(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn build(self) -> Project {
        Project {
            id: self.id,
            client_id: self.client_id,
            name: self.name,
            plan_id: self.plan_id,
            start_date: self.start_date,
        }
    }
}

/// Builder for invoices
///
/// Defaults to a pending manual invoice for client c1 issued 2024-03-01 and
/// due 2024-03-31, with one 100.00 USD line.
pub struct InvoiceBuilder {
    invoice: Invoice,
}

impl Default for InvoiceBuilder {
    fn default() -> Self {
        let invoice = Invoice::manual(
            InvoiceId::new("m-1"),
            "INV-0001",
            ClientId::new("c1"),
            date(2024, 3, 1),
            date(2024, 3, 31),
            Currency::USD,
        )
        .with_item(InvoiceItem::new("Consulting", dec!(1), dec!(100.00)));
        Self { invoice }
    }
}

impl InvoiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a subscription invoice as the reconciler would generate it
    pub fn subscription(project_id: &str, issue_date: NaiveDate) -> Self {
        let mut builder = Self::default()
            .with_id(&format!("inv-{}-{}", project_id, issue_date.format("%Y-%m-%d")))
            .with_number(&format!(
                "SUB-{}-{}",
                project_id.to_uppercase(),
                issue_date.format("%Y%m")
            ))
            .for_project(project_id)
            .issued(issue_date);
        builder.invoice.kind = InvoiceKind::Subscription;
        builder
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.invoice.id = InvoiceId::new(id);
        self
    }

    pub fn with_number(mut self, number: &str) -> Self {
        self.invoice.invoice_number = number.to_string();
        self
    }

    pub fn with_client(mut self, client_id: &str) -> Self {
        self.invoice.client_id = ClientId::new(client_id);
        self
    }

    pub fn for_project(mut self, project_id: &str) -> Self {
        self.invoice.project_id = Some(ProjectId::new(project_id));
        self
    }

    /// Sets the issue date and a due date 15 days later
    pub fn issued(mut self, issue_date: NaiveDate) -> Self {
        self.invoice.issue_date = issue_date;
        self.invoice.due_date = issue_date + chrono::Duration::days(15);
        self
    }

    pub fn due(mut self, due_date: NaiveDate) -> Self {
        self.invoice.due_date = due_date;
        self
    }

    pub fn with_status(mut self, status: InvoiceStatus) -> Self {
        self.invoice.status = status;
        self
    }

    pub fn paid(self) -> Self {
        self.with_status(InvoiceStatus::Paid)
    }

    pub fn in_currency(mut self, currency: Currency) -> Self {
        self.invoice.currency = currency;
        self
    }

    /// Replaces all line items with a single one
    pub fn single_item(mut self, description: &str, quantity: Decimal, price: Decimal) -> Self {
        self.invoice.items = vec![InvoiceItem::new(description, quantity, price)];
        self
    }

    pub fn with_item(mut self, description: &str, quantity: Decimal, price: Decimal) -> Self {
        self.invoice.items.push(InvoiceItem::new(description, quantity, price));
        self
    }

    pub fn build(self) -> Invoice {
        self.invoice
    }
}
