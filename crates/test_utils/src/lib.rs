//! Test Utilities Crate
//!
//! Shared test infrastructure for the billing crates.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built clients, plans, projects and instants
//! - `builders`: Builder patterns for projects and invoices
//! - `assertions`: Assertions over reconciled invoice collections
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
