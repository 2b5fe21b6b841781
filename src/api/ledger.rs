//! Implements the `Ledger` trait for reading and writing the finance spreadsheet through a `Sheet`.

use crate::api::{Sheet, SheetRange};
use crate::error::Res;
use crate::model::{
    CategoryData, HeaderData, Layout, RecentTransactions, TransactionRow, TransactionType,
};
use anyhow::Context;
use tracing::{debug, trace};

/// The spreadsheet as a ledger: a header row, category lists and a growing list of transaction
/// rows.
#[async_trait::async_trait]
pub(crate) trait Ledger {
    /// Reads the header row of the transactions sheet and the account names in it.
    async fn header(&mut self) -> Res<HeaderData>;

    /// Reads the expense, income and invest category lists.
    async fn categories(&mut self) -> Res<CategoryData>;

    /// The 1-based row number after the last filled cell of column A.
    async fn next_row(&mut self) -> Res<usize>;

    /// Writes `row` at `row_number`, columns A through O. Returns the A1 range written.
    async fn write_row(&mut self, row_number: usize, row: &TransactionRow) -> Res<String>;

    /// Reads the last `limit` transactions, newest first.
    async fn recent(&mut self, limit: usize) -> Res<RecentTransactions>;
}

/// Implements the `Ledger` trait on top of a dynamically-dispatched `Sheet`.
pub(super) struct LedgerImpl {
    sheet: Box<dyn Sheet + Send>,
    layout: Layout,
}

impl LedgerImpl {
    pub(super) fn new(sheet: Box<dyn Sheet + Send>, layout: Layout) -> Self {
        Self { sheet, layout }
    }
}

#[async_trait::async_trait]
impl Ledger for LedgerImpl {
    async fn header(&mut self) -> Res<HeaderData> {
        let sheet_name = &self.layout.transactions_sheet;
        let headers = self
            .sheet
            .get_row(sheet_name, self.layout.header_row)
            .await
            .with_context(|| format!("Failed to read the header row of {sheet_name}"))?;
        let accounts = self.layout.accounts(&headers);
        debug!("Found {} accounts in the header row", accounts.len());
        Ok(HeaderData { headers, accounts })
    }

    async fn categories(&mut self) -> Res<CategoryData> {
        let sheet_name = &self.layout.categories_sheet;
        let column = self
            .sheet
            .get_column(sheet_name, 0)
            .await
            .with_context(|| format!("Failed to read the categories from {sheet_name}"))?;
        let categories = CategoryData {
            expense: self.layout.expense_rows.pick(&column),
            income: self.layout.income_rows.pick(&column),
            invest: self.layout.invest_rows.pick(&column),
        };
        trace!(
            "{} {} categories, {} {} categories, {} {} categories",
            categories.expense.len(),
            TransactionType::Expense,
            categories.income.len(),
            TransactionType::Income,
            categories.invest.len(),
            TransactionType::Invest,
        );
        Ok(categories)
    }

    async fn next_row(&mut self) -> Res<usize> {
        let sheet_name = &self.layout.transactions_sheet;
        let column = self
            .sheet
            .get_column(sheet_name, 0)
            .await
            .with_context(|| format!("Failed to read column A of {sheet_name}"))?;
        Ok(column.len() + 1)
    }

    async fn write_row(&mut self, row_number: usize, row: &TransactionRow) -> Res<String> {
        let range = TransactionRow::range(&self.layout.transactions_sheet, row_number);
        let data = [SheetRange {
            range: range.clone(),
            values: vec![row.to_values()],
        }];
        self.sheet
            .write_ranges(&data)
            .await
            .with_context(|| format!("Failed to write the transaction to {range}"))?;
        Ok(range)
    }

    async fn recent(&mut self, limit: usize) -> Res<RecentTransactions> {
        let sheet_name = &self.layout.transactions_sheet;
        let values = self
            .sheet
            .get(sheet_name)
            .await
            .with_context(|| format!("Failed to read {sheet_name}"))?;
        Ok(RecentTransactions::from_sheet(
            &values,
            self.layout.header_row,
            limit,
        ))
    }
}
