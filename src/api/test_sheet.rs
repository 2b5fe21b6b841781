//! Implements the `Sheet` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without using Google Sheets. Set `QUICK_ENTRY_IN_TEST_MODE` to use it.

use crate::api::{Sheet, SheetRange};
use crate::error::Res;
use anyhow::{bail, Context};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{LazyLock, Mutex, MutexGuard};

/// The contents of one spreadsheet. The map key is the sheet name and the map value is the rows of
/// the sheet, starting with row 1.
pub(crate) type TestSheetState = HashMap<String, Vec<Vec<String>>>;

/// Every spreadsheet opened in this process, keyed by spreadsheet ID or name. Each new handle on
/// the same spreadsheet sees what earlier handles wrote.
static SPREADSHEETS: LazyLock<Mutex<HashMap<String, TestSheetState>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn spreadsheets() -> MutexGuard<'static, HashMap<String, TestSheetState>> {
    SPREADSHEETS.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// An implementation of the `Sheet` trait that does not use Google sheets. A spreadsheet that has
/// not been seen before is seeded with some existing data.
pub(crate) struct TestSheet {
    key: String,
}

impl TestSheet {
    pub(crate) fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        spreadsheets()
            .entry(key.clone())
            .or_insert_with(default_data);
        Self { key }
    }

    /// A copy of everything in this spreadsheet.
    #[cfg(test)]
    pub(crate) fn get_state(&self) -> TestSheetState {
        spreadsheets().get(&self.key).cloned().unwrap_or_default()
    }

    /// Replaces everything in this spreadsheet.
    #[cfg(test)]
    pub(crate) fn set_state(&self, state: TestSheetState) {
        spreadsheets().insert(self.key.clone(), state);
    }

    fn sheet(&self, sheet_name: &str) -> Res<Vec<Vec<String>>> {
        spreadsheets()
            .get(&self.key)
            .and_then(|state| state.get(sheet_name))
            .cloned()
            .with_context(|| format!("Sheet '{sheet_name}' not found"))
    }
}

#[async_trait::async_trait]
impl Sheet for TestSheet {
    async fn get(&mut self, sheet_name: &str) -> Res<Vec<Vec<String>>> {
        let mut rows: Vec<Vec<String>> = self.sheet(sheet_name)?.into_iter().map(trim).collect();
        while rows.last().is_some_and(|row| row.is_empty()) {
            rows.pop();
        }
        Ok(rows)
    }

    async fn get_row(&mut self, sheet_name: &str, row: usize) -> Res<Vec<String>> {
        let rows = self.sheet(sheet_name)?;
        let values = row
            .checked_sub(1)
            .and_then(|ix| rows.get(ix))
            .cloned()
            .unwrap_or_default();
        Ok(trim(values))
    }

    async fn get_column(&mut self, sheet_name: &str, column: usize) -> Res<Vec<String>> {
        let rows = self.sheet(sheet_name)?;
        let values = rows
            .iter()
            .map(|row| row.get(column).cloned().unwrap_or_default())
            .collect();
        Ok(trim(values))
    }

    async fn write_ranges(&mut self, data: &[SheetRange]) -> Res<()> {
        let mut all = spreadsheets();
        let state = all.entry(self.key.clone()).or_default();
        for sheet_range in data {
            let (sheet_name, first_row, first_col) = parse_range_start(&sheet_range.range)?;
            let Some(rows) = state.get_mut(sheet_name) else {
                bail!("Sheet '{sheet_name}' not found");
            };
            for (offset, values) in sheet_range.values.iter().enumerate() {
                let ix = first_row - 1 + offset;
                if rows.len() <= ix {
                    rows.resize(ix + 1, Vec::new());
                }
                let row = &mut rows[ix];
                if row.len() < first_col + values.len() {
                    row.resize(first_col + values.len(), String::new());
                }
                for (col, value) in values.iter().enumerate() {
                    row[first_col + col] = user_entered(value);
                }
            }
        }
        Ok(())
    }
}

/// What the sheet stores for a user-entered value: a leading `'` marks literal text and is not
/// kept.
fn user_entered(value: &str) -> String {
    value.strip_prefix('\'').unwrap_or(value).to_string()
}

/// Drops blank values after the last filled one, the way the Sheets API does.
fn trim(mut values: Vec<String>) -> Vec<String> {
    while values.last().is_some_and(|v| v.is_empty()) {
        values.pop();
    }
    values
}

/// Parses the sheet name, 1-based row and zero-based column of the top-left cell of an A1 range
/// like `TRNSX!A12:O12`.
fn parse_range_start(range: &str) -> Res<(&str, usize, usize)> {
    let (sheet_name, cells) = range
        .split_once('!')
        .with_context(|| format!("Range '{range}' has no sheet name"))?;
    let start = cells.split(':').next().unwrap_or(cells);
    let digits_at = start
        .find(|c: char| c.is_ascii_digit())
        .with_context(|| format!("Range '{range}' has no row number"))?;
    let (letters, digits) = start.split_at(digits_at);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_uppercase()) {
        bail!("Range '{range}' has an invalid column");
    }
    let column = letters
        .bytes()
        .fold(0usize, |acc, b| acc * 26 + usize::from(b - b'A' + 1))
        - 1;
    let row: usize = digits
        .parse()
        .with_context(|| format!("Range '{range}' has an invalid row number"))?;
    if row == 0 {
        bail!("Range '{range}' has row 0");
    }
    Ok((sheet_name, row, column))
}

/// Provides the seed data from this module.
fn default_data() -> TestSheetState {
    let mut map = HashMap::new();
    // The seed is a constant in this file, it always parses.
    let transactions = load_csv(TRANSACTION_DATA).unwrap_or_default();
    map.insert("TRNSX".to_string(), transactions);
    map.insert("Stat".to_string(), stat_data());
    map
}

/// Loads data from a CSV-formatted string.
fn load_csv(csv_data: &str) -> Res<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(Cursor::new(csv_data.as_bytes()));

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    Ok(rows)
}

/// Seed transaction data. Rows 1 through 3 are a title block, row 4 holds the headers, and
/// column P holds a running balance that the sheet computes. The row with a blank date is a
/// subtotal line.
const TRANSACTION_DATA: &str = r##"Household Ledger,,,,,,,,,,,,,,,
Quick entry,,,,,,,,,,,,,,,
,,,,,,,,,,,,,,,
Date,Type,Category,Note,Cash,BDO,GCash,Maya,Credit Card,,,,,,,Balance
1 Oct 2026,INCOME,Salary,October pay,,"25,000.00",,,,,,,,,,"25,000.00"
2 Oct 2026,TRNSFR,,ATM,"2,000.00","-2,000.00",,,,,,,,,,"25,000.00"
3 Oct 2026,EXPENSE,Food,Lunch,-250.00,,,,,,,,,,,"24,750.00"
,,,Subtotal,"1,750.00","23,000.00",,,,,,,,,,
5 Oct 2026,EXPENSE,Transport,Grab,,,-180.00,,,,,,,,,"24,570.00"
7 Oct 2026,INVST,Stocks,Index fund,,"-5,000.00",,,,,,,,,,"19,570.00"
"##;

/// Seed data for the `Stat` sheet. Column A holds headings and the three category lists at rows
/// 9 through 37, 39 through 43 and 48 through 55.
fn stat_data() -> Vec<Vec<String>> {
    let mut rows = vec![Vec::new(); 56];
    let mut put = |first_row: usize, values: &[&str]| {
        for (offset, value) in values.iter().enumerate() {
            rows[first_row - 1 + offset] = vec![value.to_string(), "0.00".to_string()];
        }
    };
    put(1, &["Statistics"]);
    put(8, &["EXPENSES"]);
    put(9, &["Food", "Transport", "Utilities", "Rent", "Groceries", "Health"]);
    put(38, &["INCOME"]);
    put(39, &["Salary", "Freelance", "Interest"]);
    put(47, &["INVESTMENTS"]);
    put(48, &["Stocks", "Crypto", "MP2"]);
    put(56, &["Total"]);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn new_sheet() -> TestSheet {
        TestSheet::new(Uuid::new_v4().to_string())
    }

    #[tokio::test]
    async fn test_seed_header_row() {
        let mut sheet = new_sheet();
        let header = sheet.get_row("TRNSX", 4).await.unwrap();
        assert_eq!(header[0], "Date");
        assert_eq!(header[4], "Cash");
        assert_eq!(header[15], "Balance");
    }

    #[tokio::test]
    async fn test_get_column_trims_trailing_blanks() {
        let mut sheet = new_sheet();
        let column = sheet.get_column("TRNSX", 0).await.unwrap();
        assert_eq!(column.len(), 10);
        assert_eq!(column[2], "");
        assert_eq!(column.last().unwrap(), "7 Oct 2026");
    }

    #[tokio::test]
    async fn test_stat_column() {
        let mut sheet = new_sheet();
        let column = sheet.get_column("Stat", 0).await.unwrap();
        assert_eq!(column[8], "Food");
        assert_eq!(column[38], "Salary");
        assert_eq!(column[47], "Stocks");
    }

    #[tokio::test]
    async fn test_missing_sheet() {
        let mut sheet = new_sheet();
        let err = sheet.get("Nope").await.unwrap_err();
        assert!(err.to_string().contains("Sheet 'Nope' not found"));
    }

    #[tokio::test]
    async fn test_write_is_shared_between_handles() {
        let key = Uuid::new_v4().to_string();
        let mut first = TestSheet::new(&key);
        let values = vec![(1..=15).map(|n| n.to_string()).collect::<Vec<_>>()];
        first
            .write_ranges(&[SheetRange {
                range: "TRNSX!A12:O12".to_string(),
                values,
            }])
            .await
            .unwrap();

        let mut second = TestSheet::new(&key);
        let rows = second.get("TRNSX").await.unwrap();
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[11].len(), 15);
        assert_eq!(rows[11][0], "1");
        assert_eq!(rows[11][14], "15");
        assert!(rows[10].is_empty());
    }

    #[tokio::test]
    async fn test_write_drops_literal_marker() {
        let mut sheet = new_sheet();
        sheet
            .write_ranges(&[SheetRange {
                range: "TRNSX!A11:B11".to_string(),
                values: vec![vec!["'=1+1".to_string(), "-5.00".to_string()]],
            }])
            .await
            .unwrap();
        let row = sheet.get_row("TRNSX", 11).await.unwrap();
        assert_eq!(row, vec!["=1+1", "-5.00"]);
    }

    #[test]
    fn test_parse_range_start() {
        assert_eq!(parse_range_start("TRNSX!A12:O12").unwrap(), ("TRNSX", 12, 0));
        assert_eq!(parse_range_start("Stat!AB3").unwrap(), ("Stat", 3, 27));
        assert!(parse_range_start("A1:B2").is_err());
        assert!(parse_range_start("TRNSX!12:12").is_err());
        assert!(parse_range_start("TRNSX!A0").is_err());
    }

    #[test]
    fn test_set_state_replaces() {
        let sheet = new_sheet();
        let mut state = TestSheetState::new();
        state.insert("TRNSX".to_string(), vec![vec!["x".to_string()]]);
        sheet.set_state(state.clone());
        assert_eq!(sheet.get_state(), state);
    }
}
