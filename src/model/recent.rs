//! Builds the "last few transactions" table from the raw values of the transactions sheet.

use serde::Serialize;
use std::collections::HashSet;

/// Display names that replace whatever the sheet has in the first four header cells.
const FIXED_HEADERS: [&str; 4] = ["Date", "Type", "Category", "Note"];

/// The number of recent transactions shown.
pub const RECENT_LIMIT: usize = 5;

/// Cleans a raw header row so that every column has a unique, non-blank name:
/// - when there are at least four headers, the first four become `Date`, `Type`, `Category`,
///   `Note`
/// - a blank header becomes `Col_<n>` where `n` is its 1-based position
/// - a repeated name gets `_<k>` appended, using the smallest `k` not already taken
///
/// Running this on its own output returns the same list.
pub fn clean_headers<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut headers: Vec<String> = raw.iter().map(|s| s.as_ref().to_string()).collect();
    if headers.len() >= FIXED_HEADERS.len() {
        for (slot, name) in headers.iter_mut().zip(FIXED_HEADERS) {
            *slot = name.to_string();
        }
    }

    let mut seen = HashSet::new();
    let mut cleaned = Vec::with_capacity(headers.len());
    for (ix, name) in headers.into_iter().enumerate() {
        let name = if name.trim().is_empty() {
            format!("Col_{}", ix + 1)
        } else {
            name
        };

        let mut unique = name.clone();
        let mut k = 1;
        while seen.contains(&unique) {
            unique = format!("{name}_{k}");
            k += 1;
        }
        seen.insert(unique.clone());
        cleaned.push(unique);
    }
    cleaned
}

/// The most recent transactions, newest first, ready to display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecentTransactions {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RecentTransactions {
    /// Builds the table from all values of the transactions sheet. `header_row` is the 1-based
    /// row number of the header row; rows after it are data.
    ///
    /// Rows with a blank first cell are ignored. The table is as wide as the widest remaining
    /// row and shorter rows are padded with blanks.
    pub fn from_sheet(values: &[Vec<String>], header_row: usize, limit: usize) -> Self {
        let header_ix = header_row.saturating_sub(1);
        let raw_headers = values.get(header_ix).cloned().unwrap_or_default();
        let headers = clean_headers(&raw_headers);

        let valid: Vec<&Vec<String>> = values
            .iter()
            .skip(header_ix + 1)
            .filter(|row| row.first().is_some_and(|date| !date.trim().is_empty()))
            .collect();

        let width = valid.iter().map(|row| row.len()).max().unwrap_or(0);
        let headers: Vec<String> = (0..width)
            .map(|ix| {
                headers
                    .get(ix)
                    .cloned()
                    .unwrap_or_else(|| format!("Col_{}", ix + 1))
            })
            .collect();

        let rows = valid
            .iter()
            .rev()
            .take(limit)
            .map(|row| {
                let mut padded = (*row).clone();
                padded.resize(width, String::new());
                padded
            })
            .collect();

        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// The rows, newest first.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Renders the table for a terminal.
    pub fn render(&self) -> String {
        let mut table = comfy_table::Table::new();
        table
            .load_preset(comfy_table::presets::UTF8_FULL)
            .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
            .set_content_arrangement(comfy_table::ContentArrangement::Dynamic)
            .set_header(self.headers.clone());
        for row in &self.rows {
            table.add_row(row.clone());
        }
        table.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_clean_headers_fixed_names() {
        let cleaned = clean_headers(&["d", "t", "", "n", "Cash"]);
        assert_eq!(cleaned, vec!["Date", "Type", "Category", "Note", "Cash"]);
    }

    #[test]
    fn test_clean_headers_short_row_untouched() {
        let cleaned = clean_headers(&["x", ""]);
        assert_eq!(cleaned, vec!["x", "Col_2"]);
    }

    #[test]
    fn test_clean_headers_blank_and_duplicates() {
        let cleaned = clean_headers(&[
            "a", "b", "c", "d", "Cash", "Cash", "", "Cash", "Cash_1", "  ",
        ]);
        assert_eq!(
            cleaned,
            vec![
                "Date", "Type", "Category", "Note", "Cash", "Cash_1", "Col_7", "Cash_2",
                "Cash_1_1", "Col_10"
            ]
        );
    }

    #[test]
    fn test_clean_headers_idempotent() {
        let once = clean_headers(&["", "", "", "", "Bank", "Bank", "", "Date", "Col_9", ""]);
        let twice = clean_headers(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_recent_latest_first_and_limited() {
        let dates: Vec<String> = (1..=8).map(|d| format!("{d} Jan 2025")).collect();
        let mut rows: Vec<Vec<&str>> = vec![
            vec!["title"],
            vec![],
            vec!["totals"],
            vec!["Date", "Type", "Category", "Note", "Cash"],
        ];
        for date in &dates {
            rows.push(vec![date.as_str(), "EXPENSE", "Food", "", "-1"]);
        }
        let values: Vec<Vec<String>> = rows
            .iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect();

        let recent = RecentTransactions::from_sheet(&values, 4, RECENT_LIMIT);
        assert_eq!(recent.rows().len(), 5);
        assert_eq!(recent.rows()[0][0], "8 Jan 2025");
        assert_eq!(recent.rows()[4][0], "4 Jan 2025");
    }

    #[test]
    fn test_recent_skips_blank_dates_and_pads() {
        let values = sheet(&[
            &[],
            &[],
            &[],
            &["Date", "Type", "Category", "Note", "Cash", "Bank", "Total"],
            &["1 Jan 2025", "INCOME", "Salary", "", "", "100"],
            &["", "", "", "", "", "", "=SUM()"],
            &["  ", "EXPENSE"],
            &["2 Jan 2025", "EXPENSE", "Food", "lunch", "-5"],
        ]);
        let recent = RecentTransactions::from_sheet(&values, 4, RECENT_LIMIT);
        assert_eq!(
            recent.headers(),
            &["Date", "Type", "Category", "Note", "Cash", "Bank"]
        );
        assert_eq!(recent.rows().len(), 2);
        assert_eq!(
            recent.rows()[0],
            vec!["2 Jan 2025", "EXPENSE", "Food", "lunch", "-5", ""]
        );
        assert_eq!(recent.rows()[1][5], "100");
    }

    #[test]
    fn test_recent_row_wider_than_header() {
        let values = sheet(&[
            &["Date", "Type", "Category", "Note", "Cash"],
            &["3 Feb 2025", "INCOME", "Gift", "", "20", "", "20.00"],
        ]);
        let recent = RecentTransactions::from_sheet(&values, 1, RECENT_LIMIT);
        assert_eq!(
            recent.headers(),
            &["Date", "Type", "Category", "Note", "Cash", "Col_6", "Col_7"]
        );
        assert_eq!(recent.rows()[0][6], "20.00");
    }

    #[test]
    fn test_recent_empty() {
        let values = sheet(&[&[], &[], &[], &["Date", "Type"]]);
        let recent = RecentTransactions::from_sheet(&values, 4, RECENT_LIMIT);
        assert!(recent.is_empty());
        assert!(recent.headers().is_empty());
    }

    #[test]
    fn test_render_contains_values() {
        let values = sheet(&[
            &["Date", "Type", "Category", "Note", "Cash"],
            &["3 Feb 2025", "INCOME", "Gift", "", "20"],
        ]);
        let recent = RecentTransactions::from_sheet(&values, 1, RECENT_LIMIT);
        let rendered = recent.render();
        assert!(rendered.contains("3 Feb 2025"));
        assert!(rendered.contains("Cash"));
    }
}
