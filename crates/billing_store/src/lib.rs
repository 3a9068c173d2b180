//! Billing Store - the single owner of console state
//!
//! Holds clients, projects, payment plans and invoices, and funnels every
//! change through one write path that keeps subscription invoices reconciled.
//! Consumers read immutable snapshots and subscribe to changes instead of
//! sharing mutable state.
//!
//! # Example
//!
//! ```rust,ignore
//! use billing_store::BillingStore;
//!
//! let store = BillingStore::builder()
//!     .clock(Arc::new(SystemClock))
//!     .port(Arc::new(JsonFileStore::new("billing.json")))
//!     .load()
//!     .await?;
//!
//! let mut changes = store.subscribe();
//! store.upsert_plan(plan).await?;
//! changes.changed().await?;
//! render(&changes.borrow());
//! ```

pub mod ports;
pub mod snapshot;
pub mod store;

pub use ports::SnapshotPort;
pub use snapshot::BillingSnapshot;
pub use store::{BillingStore, BillingStoreBuilder, ReconcileReport};
