//! Types that represent the core data model, such as `Amount`, `TransactionRow` and the reference
//! data read from the spreadsheet.
mod amount;
pub mod layout;
pub mod recent;
pub mod reference;
pub mod row;
mod transaction_type;

pub use amount::{Amount, AmountError, Money, DEFAULT_CURRENCY};
pub use layout::{Layout, RowRange};
pub use recent::{clean_headers, RecentTransactions, RECENT_LIMIT};
pub use reference::{CategoryData, HeaderData, ReferenceData};
pub use row::{column_letter, Cell, TransactionRow};
pub use transaction_type::TransactionType;
