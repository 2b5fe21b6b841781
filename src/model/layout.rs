//! Where things live in the spreadsheet.
//!
//! The tool depends on a fixed layout: headers on row 4 of the transactions sheet, account names
//! in columns E through O of that row, and three category lists at fixed rows of column A of the
//! `Stat` sheet. The defaults describe that layout; `config.json` can override any of it.

use anyhow::ensure;
use serde::{Deserialize, Serialize};

use crate::error::Res;
use crate::model::row::ROW_WIDTH;

/// An inclusive, 1-based range of rows, e.g. rows 9 through 37.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRange {
    pub first: usize,
    pub last: usize,
}

impl RowRange {
    pub const fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }

    /// Picks the non-blank values of this range out of a column of values, where `column[0]` is
    /// row 1.
    pub fn pick(&self, column: &[String]) -> Vec<String> {
        let start = self.first.saturating_sub(1);
        column
            .iter()
            .skip(start)
            .take(self.last.saturating_sub(start))
            .filter(|v| !v.trim().is_empty())
            .cloned()
            .collect()
    }
}

/// The spreadsheet layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// The sheet (tab) that transactions are written to.
    pub transactions_sheet: String,
    /// The sheet (tab) whose column A holds the category lists.
    pub categories_sheet: String,
    /// The 1-based row holding the column headers of the transactions sheet.
    pub header_row: usize,
    /// Zero-based, half-open range of header positions that hold account names.
    pub account_columns: (usize, usize),
    pub expense_rows: RowRange,
    pub income_rows: RowRange,
    pub invest_rows: RowRange,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            transactions_sheet: "TRNSX".to_string(),
            categories_sheet: "Stat".to_string(),
            header_row: 4,
            account_columns: (4, ROW_WIDTH),
            expense_rows: RowRange::new(9, 37),
            income_rows: RowRange::new(39, 43),
            invest_rows: RowRange::new(48, 55),
        }
    }
}

impl Layout {
    /// Checks that the layout makes sense.
    pub fn validate(&self) -> Res<()> {
        ensure!(
            !self.transactions_sheet.is_empty() && !self.categories_sheet.is_empty(),
            "Sheet names in the layout cannot be empty"
        );
        ensure!(self.header_row >= 1, "The header row is 1-based and must be at least 1");
        let (start, end) = self.account_columns;
        ensure!(
            start < end && end <= ROW_WIDTH,
            "Account columns must be a non-empty range within the first {ROW_WIDTH} columns, \
            got {start}..{end}"
        );
        for (name, range) in [
            ("expense", self.expense_rows),
            ("income", self.income_rows),
            ("invest", self.invest_rows),
        ] {
            ensure!(
                range.first >= 1 && range.first <= range.last,
                "The {name} category rows must be 1-based with first <= last, got {}..={}",
                range.first,
                range.last
            );
        }
        Ok(())
    }

    /// The account names found in a raw header row: the non-blank entries in `account_columns`.
    pub fn accounts(&self, headers: &[String]) -> Vec<String> {
        let (start, end) = self.account_columns;
        headers
            .iter()
            .skip(start)
            .take(end.saturating_sub(start))
            .filter(|h| !h.trim().is_empty())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_is_valid() {
        Layout::default().validate().unwrap();
    }

    #[test]
    fn test_invalid_account_columns() {
        let layout = Layout {
            account_columns: (4, 16),
            ..Layout::default()
        };
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_accounts_slice() {
        let headers = strings(&[
            "Date", "Type", "Cat", "Note", "Cash", "", "Bank", " ", "GCash", "a", "b", "c", "d",
            "e", "f", "Total", "Extra",
        ]);
        let accounts = Layout::default().accounts(&headers);
        assert_eq!(
            accounts,
            strings(&["Cash", "Bank", "GCash", "a", "b", "c", "d", "e", "f"])
        );
    }

    #[test]
    fn test_accounts_short_header() {
        let headers = strings(&["Date", "Type"]);
        assert!(Layout::default().accounts(&headers).is_empty());
    }

    #[test]
    fn test_row_range_pick() {
        let column: Vec<String> = (1..=60).map(|n| format!("r{n}")).collect();
        let layout = Layout::default();
        let expense = layout.expense_rows.pick(&column);
        assert_eq!(expense.first().unwrap(), "r9");
        assert_eq!(expense.last().unwrap(), "r37");
        assert_eq!(expense.len(), 29);
        assert_eq!(layout.income_rows.pick(&column), strings(&["r39", "r40", "r41", "r42", "r43"]));
        assert_eq!(layout.invest_rows.pick(&column).len(), 8);
    }

    #[test]
    fn test_row_range_pick_blank_and_short() {
        let column = strings(&["", "", "", "", "", "", "", "", "Food", "", "  ", "Rent"]);
        assert_eq!(
            Layout::default().expense_rows.pick(&column),
            strings(&["Food", "Rent"])
        );
        assert!(Layout::default().invest_rows.pick(&column).is_empty());
    }

    #[test]
    fn test_partial_layout_json_uses_defaults() {
        let layout: Layout = serde_json::from_str(r#"{"header_row": 2}"#).unwrap();
        assert_eq!(layout.header_row, 2);
        assert_eq!(layout.transactions_sheet, "TRNSX");
    }
}
