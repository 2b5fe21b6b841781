use crate::model::TransactionType;
use serde::{Deserialize, Serialize};

/// The header row of the transactions sheet and the account names taken from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderData {
    /// The header row exactly as read. Account columns are found by position in this list.
    pub headers: Vec<String>,
    pub accounts: Vec<String>,
}

impl HeaderData {
    /// The zero-based column of `account`, i.e. its first position in the header row.
    pub fn column_of(&self, account: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == account)
    }
}

/// The three category lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryData {
    pub expense: Vec<String>,
    pub income: Vec<String>,
    pub invest: Vec<String>,
}

impl CategoryData {
    /// The categories offered for `transaction_type`. Transfers have none.
    pub fn for_type(&self, transaction_type: TransactionType) -> &[String] {
        match transaction_type {
            TransactionType::Expense => &self.expense,
            TransactionType::Income => &self.income,
            TransactionType::Invest => &self.invest,
            TransactionType::Transfer => &[],
        }
    }
}

/// Everything the form needs from the spreadsheet before it can be shown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceData {
    pub header: HeaderData,
    pub categories: CategoryData,
    /// Problems that degraded the data without stopping the program.
    pub warnings: Vec<String>,
}

impl ReferenceData {
    pub fn accounts(&self) -> &[String] {
        &self.header.accounts
    }
}
