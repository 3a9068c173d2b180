//! In-memory adapter

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use billing_store::{BillingSnapshot, SnapshotPort};
use core_kernel::{DomainPort, PortError};

/// Snapshot port that keeps the last saved snapshot in memory
///
/// Counts saves so callers can check that unchanged commits are skipped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: RwLock<Option<BillingSnapshot>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `snapshot` already stored
    pub fn with_snapshot(snapshot: BillingSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(Some(snapshot)),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// The stored snapshot, if any
    pub async fn current(&self) -> Option<BillingSnapshot> {
        self.snapshot.read().await.clone()
    }
}

impl DomainPort for MemoryStore {}

#[async_trait]
impl SnapshotPort for MemoryStore {
    async fn load(&self) -> Result<Option<BillingSnapshot>, PortError> {
        Ok(self.current().await)
    }

    async fn save(&self, snapshot: &BillingSnapshot) -> Result<(), PortError> {
        *self.snapshot.write().await = Some(snapshot.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
