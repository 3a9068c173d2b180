//! Billing Store Ports
//!
//! The store persists its whole state as one snapshot. Adapters decide where
//! the snapshot lives:
//!
//! - **JSON file**: the local-storage analogue used by the CLI (`infra_store`)
//! - **Memory**: for tests and ephemeral sessions (`infra_store`)
//!
//! ```rust,ignore
//! let port: Arc<dyn SnapshotPort> = Arc::new(JsonFileStore::new("billing.json"));
//! let store = BillingStore::builder().port(port).load().await?;
//! ```

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError};

use crate::snapshot::BillingSnapshot;

/// Persistence for billing snapshots
#[async_trait]
pub trait SnapshotPort: DomainPort {
    /// Loads the last saved snapshot, or `None` if nothing was saved yet
    async fn load(&self) -> Result<Option<BillingSnapshot>, PortError>;

    /// Replaces the saved snapshot
    async fn save(&self, snapshot: &BillingSnapshot) -> Result<(), PortError>;
}
