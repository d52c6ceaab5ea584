//! Application-level errors (wraps domain and config errors)

use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::DomainError;

/// Application errors wrap domain errors and add load-time and orchestration context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("unknown computation kind '{kind}' at {key}")]
    UnknownComputation { kind: String, key: String },

    /// Reference to an id that is not loaded yet (or not at all).
    #[error("computation '{0}' referenced before it is defined")]
    UnknownReference(String),

    #[error("duplicate computation id: {0}")]
    DuplicateId(String),

    #[error("no such computation: {0}")]
    NoSuchComputation(String),

    #[error("no such period: {0}")]
    NoSuchPeriod(String),

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
