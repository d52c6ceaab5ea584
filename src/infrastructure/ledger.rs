//! In-memory ledger backend
//!
//! Accounts live in a map keyed by their full colon-separated name. The
//! ledger can be built in code or loaded from the `ledger.accounts` section
//! of a report file:
//!
//! ```yaml
//! ledger:
//!   accounts:
//!     - name: "Income:Sales"
//!       type: income
//!       splits:
//!         - { date: "2023-03-01", amount: -1200, description: "Invoice 1" }
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::{Config, ConfigResult};
use crate::domain::{Account, AccountType, Split};
use crate::infrastructure::traits::{Ledger, LedgerError};

#[derive(Debug, Clone)]
struct AccountEntry {
    account: Account,
    splits: Vec<Split>,
}

#[derive(Debug, Deserialize)]
struct AccountSpec {
    name: String,
    #[serde(rename = "type")]
    kind: AccountType,
    #[serde(default)]
    splits: Vec<Split>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    accounts: BTreeMap<String, AccountEntry>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load accounts from `ledger.accounts`; an absent section yields an empty ledger.
    pub fn load(cfg: &Config) -> ConfigResult<Self> {
        let mut ledger = Self::new();
        for section in cfg.get_list_or_empty("ledger.accounts")? {
            let spec: AccountSpec = section.deserialize()?;
            ledger.add_account(&spec.name, spec.kind, spec.splits);
        }
        debug!("loaded {} ledger accounts", ledger.accounts.len());
        Ok(ledger)
    }

    /// Builder-style [`MemoryLedger::add_account`].
    pub fn with_account(mut self, name: &str, kind: AccountType, splits: Vec<Split>) -> Self {
        self.add_account(name, kind, splits);
        self
    }

    /// Add an account, or append splits when it already exists.
    pub fn add_account(&mut self, name: &str, kind: AccountType, splits: Vec<Split>) {
        let entry = self
            .accounts
            .entry(name.to_string())
            .or_insert_with(|| AccountEntry {
                account: Account {
                    name: name.to_string(),
                    kind,
                },
                splits: Vec::new(),
            });
        entry.splits.extend(splits);
    }

    pub fn add_split(&mut self, account: &str, split: Split) -> Result<(), LedgerError> {
        let entry = self
            .accounts
            .get_mut(account)
            .ok_or_else(|| LedgerError::AccountNotFound(account.to_string()))?;
        entry.splits.push(split);
        Ok(())
    }

    pub fn account_names(&self) -> impl Iterator<Item = &str> {
        self.accounts.keys().map(String::as_str)
    }
}

impl Ledger for MemoryLedger {
    fn get_account(&self, parent: Option<&Account>, name: &str) -> Result<Account, LedgerError> {
        let full_name = match parent {
            Some(p) => format!("{}:{}", p.name, name),
            None => name.to_string(),
        };
        self.accounts
            .get(&full_name)
            .map(|entry| entry.account.clone())
            .ok_or(LedgerError::AccountNotFound(full_name))
    }

    #[instrument(level = "trace", skip(self), fields(account = %account.name))]
    fn get_splits(
        &self,
        account: &Account,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Split>, LedgerError> {
        let entry = self
            .accounts
            .get(&account.name)
            .ok_or_else(|| LedgerError::AccountNotFound(account.name.clone()))?;
        Ok(entry
            .splits
            .iter()
            .filter(|s| start <= s.date && s.date <= end)
            .cloned()
            .collect())
    }
}
