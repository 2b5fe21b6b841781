use crate::api::Mode;
use crate::args::AddArgs;
use crate::commands::recent::{load_recent, recent_message};
use crate::commands::{reference, start, today, Out};
use crate::entry::{self, Entry};
use crate::error::{ErrorType, IntoResult};
use crate::form;
use crate::model::RecentTransactions;
use crate::{Config, Result};
use anyhow::Context;
use serde::Serialize;
use tracing::{debug, info};

const ADD_FAILED: &str = "Error adding transaction";

/// What `add` wrote and the latest transactions afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Added {
    /// The A1 range that was written, e.g. `TRNSX!A42:O42`.
    pub range: String,
    pub row_number: usize,
    pub entry: Entry,
    /// `None` when the latest transactions could not be read back.
    pub recent: Option<RecentTransactions>,
}

/// Adds one transaction to the spreadsheet and shows the latest transactions.
///
/// The steps are: fill in the form from `args`, build the row, find the row after the last filled
/// row in column A, and write columns A through O of that row. Nothing is retried. The row number
/// is read just before the write with no lock held, so two submissions at the same moment can
/// pick the same row.
///
/// # Errors
/// - `ErrorType::Config` when the credentials cannot be loaded.
/// - `ErrorType::Input` when the amount is zero, the accounts are missing or not valid choices.
/// - `ErrorType::Read` when the accounts or the next row cannot be read.
/// - `ErrorType::Write` when the write fails.
pub async fn add(config: Config, mode: Mode, args: AddArgs) -> Result<Out<Added>> {
    let session = start(config, mode).await?;
    let reference = reference(&session, args.refresh()).await?;
    let view = form::render(&reference, &args.form_state(), today())?;
    let entry = entry::build(&view.submission(), &reference.header)?;
    debug!("Built row {:?}", entry.row().to_values());

    // A new handle for the write, separate from the one that loaded the reference data.
    let mut ledger = session
        .ledger()
        .await
        .context(ADD_FAILED)
        .pub_result(ErrorType::Read)?;
    let row_number = ledger
        .next_row()
        .await
        .context(ADD_FAILED)
        .pub_result(ErrorType::Read)?;
    let range = ledger
        .write_row(row_number, entry.row())
        .await
        .context(ADD_FAILED)
        .pub_result(ErrorType::Write)?;
    info!("Wrote {range}");

    let mut lines: Vec<String> = view.notes().iter().chain(entry.notes()).cloned().collect();
    lines.push(entry.summary(session.config().currency()));

    let mut warnings: Vec<String> = reference
        .warnings
        .iter()
        .chain(view.warnings())
        .chain(entry.warnings())
        .cloned()
        .collect();

    let recent = match load_recent(&session).await {
        Ok(recent) => {
            lines.push(recent_message(&recent));
            Some(recent)
        }
        Err(warning) => {
            warnings.push(warning);
            None
        }
    };

    let added = Added {
        range,
        row_number,
        entry,
        recent,
    };
    Ok(Out::new(lines.join("\n"), added).with_warnings(warnings))
}
