//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors are raised while evaluating computations against a window.
/// They are independent of configuration and ledger concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// A result was read before the computation producing it ran.
    #[error("result not computed yet: {0}")]
    ResultNotComputed(String),

    #[error("result already written: {0}")]
    ResultAlreadyWritten(String),

    #[error("result is not numeric: {0}")]
    NotNumeric(String),

    #[error("no value for {date} in '{id}'")]
    NoValueForDate { id: String, date: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
