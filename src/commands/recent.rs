use crate::api::{Mode, Session};
use crate::commands::{start, Out};
use crate::model::{RecentTransactions, RECENT_LIMIT};
use crate::{Config, Result};

/// Shows the latest transactions, newest first. A failed read is a warning, not an error.
///
/// # Errors
/// - The credentials cannot be loaded.
pub async fn recent(config: Config, mode: Mode) -> Result<Out<RecentTransactions>> {
    let session = start(config, mode).await?;
    Ok(match load_recent(&session).await {
        Ok(recent) => Out::new(recent_message(&recent), recent),
        Err(warning) => Out::new_message("").with_warnings([warning]),
    })
}

/// Reads the latest transactions through a new handle. On failure returns the warning to show.
pub(super) async fn load_recent(
    session: &Session,
) -> std::result::Result<RecentTransactions, String> {
    let loaded = match session.ledger().await {
        Ok(mut ledger) => ledger.recent(RECENT_LIMIT).await,
        Err(e) => Err(e),
    };
    loaded.map_err(|e| format!("Could not load recent transactions: {e:#}"))
}

pub(super) fn recent_message(recent: &RecentTransactions) -> String {
    if recent.is_empty() {
        "No valid transactions found to display.".to_string()
    } else {
        format!("Latest Transactions\n{}", recent.render())
    }
}
