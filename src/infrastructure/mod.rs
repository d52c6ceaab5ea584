//! Infrastructure layer: ledger backends and DI container
//!
//! This layer implements I/O boundary traits and wires up services.

pub mod di;
pub mod error;
pub mod ledger;
pub mod traits;

pub use di::ServiceContainer;
pub use error::{InfraError, InfraResult};
pub use ledger::MemoryLedger;
pub use traits::{Ledger, LedgerError};
