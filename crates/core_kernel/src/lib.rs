//! Core Kernel - Foundational types for the billing console
//!
//! This crate provides the building blocks shared by every other crate:
//! - Money and ISO 4217 currency codes with precise decimal arithmetic
//! - String-backed identifiers for clients, projects, plans and invoices
//! - Calendar helpers, the business timezone, and injectable clocks
//! - Port error types for the persistence adapters

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError};
pub use temporal::{Clock, FixedClock, SystemClock, Timezone, TemporalError};
pub use identifiers::{ClientId, ProjectId, PlanId, InvoiceId};
pub use ports::{DomainPort, PortError};
pub use error::CoreError;
