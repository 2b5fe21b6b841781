//! The fixed-width row that is written to the transactions sheet.

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// The number of columns a transaction row occupies, A through O. Columns after O hold
/// spreadsheet formulas and are never written.
pub const ROW_WIDTH: usize = 15;

/// Zero-based positions of the fixed leading columns.
pub const DATE_COL: usize = 0;
pub const TYPE_COL: usize = 1;
pub const CATEGORY_COL: usize = 2;
pub const NOTE_COL: usize = 3;

/// A single cell value in a row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(Decimal),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            Cell::Number(_) => false,
        }
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Cell::Number(d) => Some(*d),
            _ => None,
        }
    }

    /// The value sent to the sheet. Text gets a leading `'` so that the sheet keeps it as typed
    /// instead of reading it as a formula, date or number.
    pub fn entered_value(&self) -> String {
        match self {
            Cell::Text(s) if !s.is_empty() => format!("'{s}"),
            other => other.to_string(),
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(d) => Display::fmt(d, f),
        }
    }
}

/// A transaction row of exactly `ROW_WIDTH` cells. It is built once and then written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRow {
    cells: Vec<Cell>,
}

impl Default for TransactionRow {
    fn default() -> Self {
        Self {
            cells: vec![Cell::Empty; ROW_WIDTH],
        }
    }
}

impl TransactionRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cell at `index`. Returns `false`, and changes nothing, if `index` is outside the
    /// writable columns.
    pub fn set(&mut self, index: usize, cell: Cell) -> bool {
        match self.cells.get_mut(index) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The cell values as the strings sent to the sheet. Values are written as "user entered" so
    /// numbers are parsed as numbers by the sheet, while text stays literal.
    pub fn to_values(&self) -> Vec<String> {
        self.cells.iter().map(Cell::entered_value).collect()
    }

    /// The A1 range that this row occupies when written at 1-based `row_number` of `sheet_name`.
    pub fn range(sheet_name: &str, row_number: usize) -> String {
        format!(
            "{sheet_name}!A{row_number}:{}{row_number}",
            column_letter(ROW_WIDTH - 1)
        )
    }
}

/// Converts a zero-based column index to its A1 letters, e.g. `0` -> `A`, `14` -> `O`,
/// `26` -> `AA`.
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_new_row_is_blank() {
        let row = TransactionRow::new();
        assert_eq!(row.cells().len(), ROW_WIDTH);
        assert!(row.cells().iter().all(Cell::is_empty));
    }

    #[test]
    fn test_set_out_of_range() {
        let mut row = TransactionRow::new();
        assert!(row.set(14, Cell::text("x")));
        assert!(!row.set(15, Cell::text("y")));
        assert_eq!(row.cells().len(), ROW_WIDTH);
    }

    #[test]
    fn test_to_values() {
        let mut row = TransactionRow::new();
        row.set(DATE_COL, Cell::text("5 Mar 2025"));
        row.set(5, Cell::Number(Decimal::from_str("-105.00").unwrap()));
        let values = row.to_values();
        assert_eq!(values[0], "'5 Mar 2025");
        assert_eq!(values[4], "");
        assert_eq!(values[5], "-105.00");
    }

    #[test]
    fn test_text_is_written_literally() {
        let mut row = TransactionRow::new();
        row.set(NOTE_COL, Cell::text("=HYPERLINK(\"http://x\")"));
        row.set(CATEGORY_COL, Cell::text("007"));
        row.set(TYPE_COL, Cell::text(""));
        let values = row.to_values();
        assert_eq!(values[NOTE_COL], "'=HYPERLINK(\"http://x\")");
        assert_eq!(values[CATEGORY_COL], "'007");
        assert_eq!(values[TYPE_COL], "");
    }

    #[test]
    fn test_range() {
        assert_eq!(TransactionRow::range("TRNSX", 12), "TRNSX!A12:O12");
    }

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(14), "O");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(701), "ZZ");
    }
}
