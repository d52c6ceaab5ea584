//! Compute financial facts from a ledger.
//!
//! A report file declares the business entity, its accounting periods and a
//! forest of computations. [`application::DataSource`] evaluates that forest
//! for a period against a [`infrastructure::Ledger`] and caches the results.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
