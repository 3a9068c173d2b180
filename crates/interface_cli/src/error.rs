//! CLI error handling

use thiserror::Error;

use core_kernel::CoreError;
use domain_billing::BillingError;
use infra_store::StoreError;

/// Errors surfaced by a reconciliation run
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Billing(#[from] BillingError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CliError {
    /// Process exit code for the error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::Core(_) => 2,
            CliError::Billing(_) | CliError::Store(_) => 1,
        }
    }
}
