//! Infrastructure Persistence Layer
//!
//! Adapters for the [`billing_store::SnapshotPort`]:
//!
//! - [`JsonFileStore`] keeps the whole billing state in one JSON document,
//!   written atomically through a sibling temp file.
//! - [`MemoryStore`] keeps it in memory, for tests and dry runs.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_store::JsonFileStore;
//! use billing_store::BillingStore;
//!
//! let port = Arc::new(JsonFileStore::new("billing.json"));
//! let store = BillingStore::builder().port(port).load().await?;
//! ```

pub mod error;
pub mod json_file;
pub mod memory;

pub use error::StoreError;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
