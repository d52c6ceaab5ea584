//! Application layer: computation engine and services
//!
//! This layer turns report configuration into computations and evaluates
//! them against the ledger boundary trait.

pub mod computation;
pub mod error;
pub mod error_ext;
pub mod services;

pub use computation::{Computable, Computations, Fact, Output, TemporalMode};
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::LedgerResultExt;
pub use services::DataSource;
