//! Ledger entities: accounts and the splits posted to them

use std::fmt;

use chrono::NaiveDate;
use serde::Deserialize;

/// Classification of a ledger account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Asset,
    Bank,
    Cash,
    Receivable,
    Stock,
    Expense,
    Liability,
    Payable,
    Credit,
    Equity,
    Income,
}

impl AccountType {
    /// Debit-normal accounts carry a positive balance on the debit side.
    pub fn is_debit_normal(self) -> bool {
        matches!(
            self,
            AccountType::Asset
                | AccountType::Bank
                | AccountType::Cash
                | AccountType::Receivable
                | AccountType::Stock
                | AccountType::Expense
        )
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccountType::Asset => "asset",
            AccountType::Bank => "bank",
            AccountType::Cash => "cash",
            AccountType::Receivable => "receivable",
            AccountType::Stock => "stock",
            AccountType::Expense => "expense",
            AccountType::Liability => "liability",
            AccountType::Payable => "payable",
            AccountType::Credit => "credit",
            AccountType::Equity => "equity",
            AccountType::Income => "income",
        };
        f.write_str(name)
    }
}

/// A ledger account identified by its full colon-separated name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Full name, e.g. "Assets:Bank:Current"
    pub name: String,
    pub kind: AccountType,
}

/// One posting against an account.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Split {
    pub date: NaiveDate,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
}

impl Split {
    pub fn new(date: NaiveDate, amount: f64, description: impl Into<String>) -> Self {
        Self {
            date,
            amount,
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AccountType::Asset, true)]
    #[case(AccountType::Bank, true)]
    #[case(AccountType::Expense, true)]
    #[case(AccountType::Income, false)]
    #[case(AccountType::Liability, false)]
    #[case(AccountType::Equity, false)]
    fn test_debit_normal_types(#[case] kind: AccountType, #[case] expected: bool) {
        assert_eq!(kind.is_debit_normal(), expected);
    }
}
