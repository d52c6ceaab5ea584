//! Application services
//!
//! Concrete services orchestrating the computation engine. They depend on
//! the [`Ledger`](crate::infrastructure::traits::Ledger) boundary trait but
//! are themselves concrete structs.

mod datasource;

pub use datasource::{DataSource, DEFAULT_ENTITY_SCHEME};
