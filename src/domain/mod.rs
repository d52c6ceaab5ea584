//! Domain layer: value types of the computation engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no ledger access).

pub mod context;
pub mod datum;
pub mod entities;
pub mod error;
pub mod period;
pub mod result;

pub use context::{ContextArena, ContextId, ContextNode, Dimension, Entity};
pub use datum::{Datum, DatumValue};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use period::Period;
pub use result::ResultSet;
