//! Access to the finance spreadsheet.
//!
//! The `Sheet` trait is a thin layer over the Google Sheets values API. `GoogleSheet` implements
//! it against Google and `TestSheet` implements it in memory so the whole program can run without
//! network access. The `Ledger` trait sits on top of a `Sheet` and speaks in terms of headers,
//! categories and transaction rows.

mod credentials;
mod google_sheet;
mod ledger;
mod oauth;
mod test_sheet;

use crate::error::Res;
use crate::Config;

pub(crate) use credentials::Credentials;
pub(crate) use ledger::Ledger;
pub(crate) use oauth::TokenProvider;
pub(crate) use test_sheet::TestSheet;
#[cfg(test)]
pub(crate) use test_sheet::TestSheetState;

#[cfg(test)]
pub(crate) use credentials::tests::secrets_json;

/// The name of the environment variable that switches the program to the in-memory sheet.
pub const TEST_MODE_ENV: &str = "QUICK_ENTRY_IN_TEST_MODE";

/// OAuth scopes for reading and writing spreadsheets and for finding a spreadsheet by name.
pub(crate) const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];

/// Selects the `Sheet` implementation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Talk to Google Sheets.
    #[default]
    Google,
    /// Use the in-memory `TestSheet`.
    Test,
}

impl Mode {
    /// `Mode::Test` when `QUICK_ENTRY_IN_TEST_MODE` is set to a non-empty value, otherwise
    /// `Mode::Google`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Google,
        }
    }
}

/// A block of values and the A1 range to write them to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SheetRange {
    pub(crate) range: String,
    pub(crate) values: Vec<Vec<String>>,
}

/// The spreadsheet operations the program needs. Values are formatted strings, the way the
/// spreadsheet displays them.
#[async_trait::async_trait]
pub(crate) trait Sheet {
    /// Gets every value of `sheet_name`, one `Vec` per row, starting with row 1.
    async fn get(&mut self, sheet_name: &str) -> Res<Vec<Vec<String>>>;

    /// Gets the values of the 1-based `row` of `sheet_name`.
    async fn get_row(&mut self, sheet_name: &str, row: usize) -> Res<Vec<String>>;

    /// Gets the values of the zero-based `column` of `sheet_name`, starting with row 1. Blank
    /// cells after the last filled cell are not returned.
    async fn get_column(&mut self, sheet_name: &str, column: usize) -> Res<Vec<String>>;

    /// Writes each range as if a user typed the values.
    async fn write_ranges(&mut self, data: &[SheetRange]) -> Res<()>;
}

/// Opens a new handle on the configured spreadsheet.
pub(crate) async fn sheet(
    config: &Config,
    credentials: &Credentials,
    mode: Mode,
) -> Res<Box<dyn Sheet + Send>> {
    match mode {
        Mode::Google => {
            let token_provider = TokenProvider::new(credentials).await?;
            let sheet = google_sheet::GoogleSheet::open(config.spreadsheet(), token_provider).await?;
            Ok(Box::new(sheet))
        }
        Mode::Test => Ok(Box::new(TestSheet::new(config.spreadsheet().key()))),
    }
}

/// Opens a new `Ledger` on the configured spreadsheet.
pub(crate) async fn ledger(
    config: &Config,
    credentials: &Credentials,
    mode: Mode,
) -> Res<Box<dyn Ledger + Send>> {
    let sheet = sheet(config, credentials, mode).await?;
    Ok(Box::new(ledger::LedgerImpl::new(sheet, config.layout().clone())))
}

/// The loaded credentials together with everything needed to open the spreadsheet. Each call to
/// `ledger` opens a fresh handle; nothing is shared between operations except the credentials.
#[derive(Debug, Clone)]
pub(crate) struct Session {
    config: Config,
    credentials: Credentials,
    mode: Mode,
}

impl Session {
    /// Loads the service account credentials named by `config`.
    pub(crate) async fn start(config: Config, mode: Mode) -> Res<Self> {
        let credentials = Credentials::load(&config.secrets_path()).await?;
        Ok(Self {
            config,
            credentials,
            mode,
        })
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) async fn ledger(&self) -> Res<Box<dyn Ledger + Send>> {
        ledger(&self.config, &self.credentials, self.mode).await
    }
}
