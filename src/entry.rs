//! Turns a form submission into the row that is written to the transactions sheet.
//!
//! Everything here is pure: the row is built from the submission and the header row alone, so
//! the rules for where amounts go and which sign they carry can be tested without a spreadsheet.

use crate::error::{Error, Result};
use crate::form::{Accounts, Submission};
use crate::model::row::{CATEGORY_COL, DATE_COL, NOTE_COL, ROW_WIDTH, TYPE_COL};
use crate::model::{Cell, HeaderData, Money, TransactionRow, TransactionType};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

/// A row that is ready to be written, along with what to tell the user about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    row: TransactionRow,
    transaction_type: TransactionType,
    amount: Decimal,
    category: String,
    posting: Posting,
    notes: Vec<String>,
    warnings: Vec<String>,
}

/// Where the amount went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
enum Posting {
    Single {
        account: String,
    },
    Transfer {
        from: String,
        to: String,
        fee: Decimal,
        debit: Decimal,
    },
}

/// Formats a date the way the transactions sheet expects it: day without a leading zero,
/// abbreviated month, full year, e.g. `5 Mar 2025`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%-d %b %Y").to_string()
}

/// Builds the row for `submission`.
///
/// # Errors
/// All errors are `ErrorType::Input`:
/// - the amount is zero
/// - a transfer is missing either account
/// - a single-account type whose account is unset or not in the header row
pub fn build(submission: &Submission, header: &HeaderData) -> Result<Entry> {
    if submission.amount.is_zero() {
        return Err(Error::input("Amount cannot be zero."));
    }

    let transaction_type = submission.transaction_type;
    let mut row = TransactionRow::new();
    row.set(DATE_COL, Cell::text(format_date(submission.date)));
    row.set(TYPE_COL, Cell::text(transaction_type.to_string()));
    row.set(CATEGORY_COL, Cell::text(submission.category.clone()));
    row.set(NOTE_COL, Cell::text(submission.note.clone()));

    let mut notes = Vec::new();
    let mut warnings = Vec::new();

    let posting = match &submission.accounts {
        Accounts::Transfer { from, to, fee } => {
            let (from, to) = match (from, to) {
                (Some(from), Some(to)) => (from.clone(), to.clone()),
                _ => {
                    return Err(Error::input(
                        "Please select valid accounts for the transfer.",
                    ))
                }
            };
            let debit = (submission.amount + *fee).debit();
            let credit = submission.amount.credit();

            // A side whose account is not a writable column is skipped without a warning.
            for (account, value) in [(&from, debit), (&to, credit)] {
                match header.column_of(account) {
                    Some(ix) if ix < ROW_WIDTH => {
                        row.set(ix, Cell::Number(value));
                    }
                    _ => debug!("Transfer account '{account}' has no writable column, skipping"),
                }
            }
            Posting::Transfer {
                from,
                to,
                fee: fee.value(),
                debit,
            }
        }
        Accounts::Single(account) => {
            let (account, ix) = match account
                .as_ref()
                .and_then(|a| header.column_of(a).map(|ix| (a.clone(), ix)))
            {
                Some(found) => found,
                None => return Err(Error::input("Account not found or selected.")),
            };
            let value = if transaction_type.is_outflow() {
                notes.push(format!(
                    "Automatically converting amount to negative for {transaction_type}."
                ));
                submission.amount.debit()
            } else {
                submission.amount.credit()
            };
            if !row.set(ix, Cell::Number(value)) {
                warnings.push(format!(
                    "Account column '{account}' is outside the writable range (A-O) and was \
                    skipped."
                ));
            }
            Posting::Single { account }
        }
    };

    Ok(Entry {
        row,
        transaction_type,
        amount: submission.amount.value(),
        category: submission.category.clone(),
        posting,
        notes,
        warnings,
    })
}

impl Entry {
    pub fn row(&self) -> &TransactionRow {
        &self.row
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// The message shown after the row has been written.
    pub fn summary(&self, currency: &str) -> String {
        let amount = Money::new(self.amount, currency);
        let transaction_type = self.transaction_type;
        match &self.posting {
            Posting::Transfer {
                from,
                to,
                fee,
                debit,
            } => {
                let fee_display = if fee.is_sign_positive() && !fee.is_zero() {
                    format!(
                        " (Fee: {} applied to debit, total debit: {})",
                        Money::new(*fee, currency),
                        Money::new(*debit, currency)
                    )
                } else {
                    String::new()
                };
                format!("Added {transaction_type} of {amount} from {from} to {to}.{fee_display}")
            }
            Posting::Single { account } if self.category.is_empty() => {
                format!("Added {transaction_type} of {amount} to {account}.")
            }
            Posting::Single { account } => format!(
                "Added {transaction_type} of {amount} to {account} under {}.",
                self.category
            ),
        }
    }
}
