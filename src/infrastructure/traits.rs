//! I/O boundary traits for testability
//!
//! The computation engine only talks to the ledger through [`Ledger`], so
//! services can be tested against an in-memory or counting implementation.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{Account, AccountType, Split};

/// Errors reported by a ledger backend.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("ledger backend failed: {0}")]
    Backend(String),
}

/// Account and transaction store.
pub trait Ledger: Send + Sync {
    /// Look up an account by name, relative to `parent` when given.
    fn get_account(&self, parent: Option<&Account>, name: &str) -> Result<Account, LedgerError>;

    /// Splits posted to `account` dated within `[start, end]`, both inclusive.
    fn get_splits(
        &self,
        account: &Account,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Split>, LedgerError>;

    /// Whether balances of this account type are debit-normal.
    fn is_debit(&self, kind: AccountType) -> bool {
        kind.is_debit_normal()
    }
}
