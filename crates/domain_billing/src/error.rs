//! Billing domain errors
//!
//! Reconciliation itself never fails; these errors come from user-initiated
//! writes and from persistence.

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// Client not found
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    /// Project not found
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// Payment plan not found
    #[error("Payment plan not found: {0}")]
    PlanNotFound(String),

    /// Invoice not found
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),

    /// Client still owns projects
    #[error("Client {client_id} is still referenced by {projects} project(s)")]
    ClientInUse {
        client_id: String,
        projects: usize,
    },

    /// Plan price is negative
    #[error("Invalid price {price} on plan {plan_id}")]
    InvalidPrice {
        plan_id: String,
        price: Decimal,
    },

    /// Invoice fields are inconsistent
    #[error("Invalid invoice {id}: {reason}")]
    InvalidInvoice {
        id: String,
        reason: String,
    },

    /// Operation only applies to manual invoices
    #[error("Invoice {0} is generated from a subscription and cannot be edited")]
    NotManualInvoice(String),

    /// Invoice number already used
    #[error("Invoice number already in use: {0}")]
    DuplicateInvoiceNumber(String),

    /// Persistence failed
    #[error("Persistence error: {0}")]
    Port(#[from] PortError),
}

impl BillingError {
    /// Returns true if the error names a missing entity
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BillingError::ClientNotFound(_)
                | BillingError::ProjectNotFound(_)
                | BillingError::PlanNotFound(_)
                | BillingError::InvoiceNotFound(_)
        )
    }
}
