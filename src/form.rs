//! The entry form.
//!
//! The form is a pure function of the reference data and what the user has chosen so far. Which
//! fields exist depends on the transaction type: a category selector for everything except
//! transfers, a single account for everything except transfers, and for transfers a pair of
//! accounts plus an optional fee.
//!
//! A selector behaves like a dropdown. If the user has not chosen anything it takes its first
//! option, and a choice that is not one of the options is rejected.

use crate::error::{Error, Result};
use crate::model::{Amount, ReferenceData, TransactionType};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// What the user has entered. Anything left as `None` takes the form's default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormState {
    pub date: Option<NaiveDate>,
    pub transaction_type: TransactionType,
    pub category: Option<String>,
    pub note: String,
    /// The account for non-transfer types.
    pub account: Option<String>,
    pub from_account: Option<String>,
    pub to_account: Option<String>,
    pub amount: Amount,
    /// `Some` when the fee box is checked.
    pub fee: Option<Amount>,
}

/// A dropdown: its options and the resolved selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Select {
    pub label: String,
    pub options: Vec<String>,
    pub selected: Option<String>,
}

impl Select {
    /// Resolves `choice` against `options`. No choice selects the first option, if any.
    fn new(label: impl Into<String>, options: Vec<String>, choice: Option<&str>) -> Result<Self> {
        let label = label.into();
        let selected = match choice {
            None => options.first().cloned(),
            Some(c) if options.iter().any(|o| o == c) => Some(c.to_string()),
            Some(c) => {
                return Err(Error::input(format!(
                    "'{c}' is not a valid choice for {label}. Choose one of: {}",
                    options.join(", ")
                )))
            }
        };
        Ok(Self {
            label,
            options,
            selected,
        })
    }
}

/// The fields of the form, in the order they are shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum Field {
    Date { value: NaiveDate },
    Type { value: TransactionType },
    Category(Select),
    Note { value: String },
    Account(Select),
    FromAccount(Select),
    ToAccount(Select),
    Amount { value: Amount },
    FeeCheckbox { checked: bool },
    Fee { value: Amount },
}

/// The rendered form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormView {
    fields: Vec<Field>,
    /// Problems the user should know about, e.g. a category list that failed to load.
    warnings: Vec<String>,
    /// Informational notes.
    notes: Vec<String>,
}

/// The account side of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Accounts {
    Single(Option<String>),
    Transfer {
        from: Option<String>,
        to: Option<String>,
        /// Zero when no fee applies.
        fee: Amount,
    },
}

/// The resolved values of a form, ready to be turned into a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub date: NaiveDate,
    pub transaction_type: TransactionType,
    /// Empty for transfers.
    pub category: String,
    pub note: String,
    pub accounts: Accounts,
    pub amount: Amount,
}

/// Computes the form for `state`. `today` is the default date.
///
/// # Errors
/// - A transfer where no "to" account remains once the "from" account is excluded.
/// - A choice that is not among a selector's options.
pub fn render(reference: &ReferenceData, state: &FormState, today: NaiveDate) -> Result<FormView> {
    let transaction_type = state.transaction_type;
    let mut fields = vec![
        Field::Date {
            value: state.date.unwrap_or(today),
        },
        Field::Type {
            value: transaction_type,
        },
    ];
    let mut warnings = Vec::new();
    let mut notes = Vec::new();

    if let Some(label) = transaction_type.category_label() {
        let options = reference.categories.for_type(transaction_type).to_vec();
        let select = if options.is_empty() {
            warnings.push(format!("{label} categories failed to load."));
            // With nothing to choose from, whatever was typed is used as-is.
            Select {
                label: format!("Category ({label})"),
                options,
                selected: state.category.clone(),
            }
        } else {
            Select::new(
                format!("Category ({label})"),
                options,
                state.category.as_deref(),
            )?
        };
        fields.push(Field::Category(select));
    }

    fields.push(Field::Note {
        value: state.note.clone(),
    });

    let accounts = reference.accounts().to_vec();
    if transaction_type.is_transfer() {
        let from = Select::new(
            "From Account (Debit)",
            accounts.clone(),
            state.from_account.as_deref(),
        )?;
        let to_options: Vec<String> = accounts
            .into_iter()
            .filter(|a| Some(a) != from.selected.as_ref())
            .collect();
        if to_options.is_empty() {
            return Err(Error::input(
                "Cannot perform transfer: Only one account available.",
            ));
        }
        let to = Select::new("To Account (Credit)", to_options, state.to_account.as_deref())?;
        let from_name = from.selected.clone().unwrap_or_default();
        fields.push(Field::FromAccount(from));
        fields.push(Field::ToAccount(to));
        fields.push(Field::Amount {
            value: state.amount,
        });
        fields.push(Field::FeeCheckbox {
            checked: state.fee.is_some(),
        });
        if let Some(fee) = state.fee {
            fields.push(Field::Fee { value: fee });
            notes.push(format!(
                "Fee will be added to the debited amount from {from_name}."
            ));
        }
    } else {
        fields.push(Field::Account(Select::new(
            "Account",
            accounts,
            state.account.as_deref(),
        )?));
        fields.push(Field::Amount {
            value: state.amount,
        });
    }

    Ok(FormView {
        fields,
        warnings,
        notes,
    })
}

impl FormView {
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Collects the values of the form into a `Submission`.
    pub fn submission(&self) -> Submission {
        let mut submission = Submission {
            date: NaiveDate::default(),
            transaction_type: TransactionType::default(),
            category: String::new(),
            note: String::new(),
            accounts: Accounts::Single(None),
            amount: Amount::ZERO,
        };
        let mut from = None;
        let mut to = None;
        let mut fee = Amount::ZERO;
        for field in &self.fields {
            match field {
                Field::Date { value } => submission.date = *value,
                Field::Type { value } => submission.transaction_type = *value,
                Field::Category(select) => {
                    submission.category = select.selected.clone().unwrap_or_default()
                }
                Field::Note { value } => submission.note = value.clone(),
                Field::Account(select) => {
                    submission.accounts = Accounts::Single(select.selected.clone())
                }
                Field::FromAccount(select) => from = select.selected.clone(),
                Field::ToAccount(select) => to = select.selected.clone(),
                Field::Amount { value } => submission.amount = *value,
                Field::FeeCheckbox { .. } => {}
                Field::Fee { value } => fee = *value,
            }
        }
        if submission.transaction_type.is_transfer() {
            submission.accounts = Accounts::Transfer { from, to, fee };
        }
        submission
    }
}

impl Display for FormView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for field in &self.fields {
            match field {
                Field::Date { value } => writeln!(f, "Date: {value}")?,
                Field::Type { value } => writeln!(
                    f,
                    "Transaction Type: {value} [{}]",
                    TransactionType::ALL.map(|t| t.to_string()).join(", ")
                )?,
                Field::Category(s)
                | Field::Account(s)
                | Field::FromAccount(s)
                | Field::ToAccount(s) => writeln!(
                    f,
                    "{}: {} [{}]",
                    s.label,
                    s.selected.as_deref().unwrap_or("-"),
                    s.options.join(", ")
                )?,
                Field::Note { value } => writeln!(f, "Description / Note: {value}")?,
                Field::Amount { value } => writeln!(f, "Amount (Positive Value): {value}")?,
                Field::FeeCheckbox { checked } => {
                    writeln!(f, "Add Transfer Fee?: {}", if *checked { "yes" } else { "no" })?
                }
                Field::Fee { value } => writeln!(f, "Fee Amount (Positive Value): {value}")?,
            }
        }
        Ok(())
    }
}
