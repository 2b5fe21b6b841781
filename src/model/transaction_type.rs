use serde::{Deserialize, Serialize};

/// The classification of a ledger entry. It controls which form fields are shown and the sign
/// applied to the amount when it is written.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Money spent. Written as a negative amount.
    #[default]
    #[value(name = "EXPENSE", alias = "expense")]
    Expense,
    /// Money received. Written as a positive amount.
    #[value(name = "INCOME", alias = "income")]
    Income,
    /// Money moved between two accounts. Debit is negative, credit is positive.
    #[serde(rename = "TRNSFR")]
    #[value(name = "TRNSFR", alias = "trnsfr", alias = "transfer")]
    Transfer,
    /// Money invested. Written as a negative amount.
    #[serde(rename = "INVST")]
    #[value(name = "INVST", alias = "invst", alias = "invest")]
    Invest,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

impl TransactionType {
    /// All types, in the order they are offered.
    pub const ALL: [TransactionType; 4] = [
        TransactionType::Expense,
        TransactionType::Income,
        TransactionType::Transfer,
        TransactionType::Invest,
    ];

    pub fn is_transfer(&self) -> bool {
        matches!(self, TransactionType::Transfer)
    }

    /// Whether a single-account amount of this type is written as a negative number.
    pub fn is_outflow(&self) -> bool {
        matches!(self, TransactionType::Expense | TransactionType::Invest)
    }

    /// The label used for this type's category selector, or `None` for transfers which have no
    /// category.
    pub fn category_label(&self) -> Option<&'static str> {
        match self {
            TransactionType::Expense => Some("Expense"),
            TransactionType::Income => Some("Income"),
            TransactionType::Invest => Some("Invest"),
            TransactionType::Transfer => None,
        }
    }
}
