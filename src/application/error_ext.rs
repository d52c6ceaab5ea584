//! Error conversion helpers for ledger access
//!
//! Provides an extension trait for cleaner error handling with account context.

use crate::application::{ApplicationError, ApplicationResult};
use crate::infrastructure::traits::LedgerError;

/// Extension trait for converting ledger results to `ApplicationResult` with context.
pub trait LedgerResultExt<T> {
    /// Add account context to a ledger error.
    ///
    /// # Example
    /// ```ignore
    /// ledger.get_splits(&account, start, end)
    ///     .with_account_context("get splits", &account.name)?;
    /// ```
    fn with_account_context(self, action: &str, account: &str) -> ApplicationResult<T>;
}

impl<T> LedgerResultExt<T> for Result<T, LedgerError> {
    fn with_account_context(self, action: &str, account: &str) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, account),
            source: Box::new(e),
        })
    }
}
