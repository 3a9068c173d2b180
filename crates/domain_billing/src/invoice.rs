//! Invoice management
//!
//! Invoices come in two kinds. Manual invoices are authored by users and are
//! never touched by reconciliation. Subscription invoices are generated from
//! project/plan bindings and regenerated wholesale on every reconciliation;
//! the only human edit they accept is being marked paid.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ClientId, Currency, InvoiceId, Money, ProjectId};

use crate::error::BillingError;

/// Days between issue and due date on generated invoices
pub const SUBSCRIPTION_PAYMENT_TERMS_DAYS: u64 = 15;

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceStatus {
    /// Issued, not yet due
    Pending,
    /// Fully paid
    Paid,
    /// Past due date
    Overdue,
}

/// Who owns an invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceKind {
    /// Authored by a user
    Manual,
    /// Generated by subscription reconciliation
    Subscription,
}

/// An invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Unique identifier
    pub id: InvoiceId,
    /// Invoice number (human-readable)
    pub invoice_number: String,
    /// Billed client
    pub client_id: ClientId,
    /// Related project; always set on subscription invoices
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    /// Issue date
    #[serde(with = "core_kernel::temporal::calendar_date")]
    pub issue_date: NaiveDate,
    /// Due date
    #[serde(with = "core_kernel::temporal::calendar_date")]
    pub due_date: NaiveDate,
    /// Line items, in display order
    #[serde(default)]
    pub items: Vec<InvoiceItem>,
    /// Status
    pub status: InvoiceStatus,
    /// Manual or subscription
    #[serde(rename = "type")]
    pub kind: InvoiceKind,
    /// Currency
    pub currency: Currency,
}

impl Invoice {
    /// Creates a manual invoice with no items
    pub fn manual(
        id: InvoiceId,
        invoice_number: impl Into<String>,
        client_id: ClientId,
        issue_date: NaiveDate,
        due_date: NaiveDate,
        currency: Currency,
    ) -> Self {
        Self {
            id,
            invoice_number: invoice_number.into(),
            client_id,
            project_id: None,
            issue_date,
            due_date,
            items: Vec::new(),
            status: InvoiceStatus::Pending,
            kind: InvoiceKind::Manual,
            currency,
        }
    }

    /// Attaches the invoice to a project
    pub fn for_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Appends a line item
    pub fn with_item(mut self, item: InvoiceItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn is_manual(&self) -> bool {
        self.kind == InvoiceKind::Manual
    }

    pub fn is_subscription(&self) -> bool {
        self.kind == InvoiceKind::Subscription
    }

    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }

    /// Returns Σ quantity × price in the invoice currency
    pub fn total(&self) -> Money {
        let sum: Decimal = self.items.iter().map(InvoiceItem::line_total).sum();
        Money::new(sum, self.currency)
    }

    /// Marks the invoice paid
    pub fn mark_paid(&mut self) {
        self.status = InvoiceStatus::Paid;
    }

    /// Checks the invariants enforced on user-authored writes
    pub fn validate(&self) -> Result<(), BillingError> {
        if self.invoice_number.trim().is_empty() {
            return Err(BillingError::InvalidInvoice {
                id: self.id.to_string(),
                reason: "invoice number is empty".to_string(),
            });
        }
        if self.due_date < self.issue_date {
            return Err(BillingError::InvalidInvoice {
                id: self.id.to_string(),
                reason: format!(
                    "due date {} precedes issue date {}",
                    self.due_date, self.issue_date
                ),
            });
        }
        if let Some(item) = self.items.iter().find(|item| item.quantity.is_sign_negative()) {
            return Err(BillingError::InvalidInvoice {
                id: self.id.to_string(),
                reason: format!("negative quantity on {:?}", item.description),
            });
        }
        Ok(())
    }
}

/// A line item on an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    /// Description
    pub description: String,
    /// Quantity
    #[serde(with = "core_kernel::money::amount")]
    pub quantity: Decimal,
    /// Unit price
    #[serde(with = "core_kernel::money::amount")]
    pub price: Decimal,
}

impl InvoiceItem {
    pub fn new(description: impl Into<String>, quantity: Decimal, price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            price,
        }
    }

    /// quantity × price
    pub fn line_total(&self) -> Decimal {
        self.quantity * self.price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Invoice {
        Invoice::manual(
            InvoiceId::new("m-1"),
            "INV-0001",
            ClientId::new("c1"),
            date(2024, 3, 1),
            date(2024, 3, 31),
            Currency::EUR,
        )
    }

    #[test]
    fn test_total_sums_quantity_times_price() {
        let invoice = sample()
            .with_item(InvoiceItem::new("Consulting", dec!(3), dec!(120)))
            .with_item(InvoiceItem::new("Setup", dec!(1), dec!(49.50)));

        assert_eq!(invoice.total(), Money::new(dec!(409.50), Currency::EUR));
    }

    #[test]
    fn test_empty_invoice_totals_zero() {
        assert!(sample().total().is_zero());
    }

    #[test]
    fn test_validate_rejects_due_before_issue() {
        let mut invoice = sample();
        invoice.due_date = date(2024, 2, 1);
        assert!(matches!(invoice.validate(), Err(BillingError::InvalidInvoice { .. })));
    }

    #[test]
    fn test_type_field_serialized_lowercase() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["type"], "manual");
        assert_eq!(json["status"], "Pending");
        assert_eq!(json["issueDate"], "2024-03-01");
        assert!(json.get("projectId").is_none());
    }
}
