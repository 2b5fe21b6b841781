//! These structs provide the CLI interface for the quick-entry CLI.

use crate::form::FormState;
use crate::model::{Amount, TransactionType};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing::level_filters::LevelFilter;

/// quick-entry: Add financial transactions to a Google sheet from the command line.
///
/// The spreadsheet has a transactions tab (TRNSX by default) with account names in its header
/// row, and a statistics tab (Stat by default) that lists expense, income and investment
/// categories. Each transaction is appended as one row below the last one, and the latest few
/// transactions are shown afterwards.
///
/// Access is through a Google Cloud service account. Share the spreadsheet with the service
/// account's email address and download its JSON key for use with `quick-entry init`.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration files.
    ///
    /// This is the first command you should run. You need two things ready beforehand:
    ///
    /// - The JSON key of a Google Cloud service account, passed as --secrets. The file is moved
    ///   into the data directory and made readable only by you.
    ///
    /// - The spreadsheet, shared with the service account's email address. Pass its URL as
    ///   --sheet-url or its title as --sheet-name.
    Init(InitArgs),
    /// Show the entry form for a transaction type: its fields and the options of each selector.
    Form(FormArgs),
    /// Add a transaction to the spreadsheet and show the latest transactions.
    Add(Box<AddArgs>),
    /// Show the latest transactions.
    Recent,
    /// Reload the accounts and categories from the spreadsheet instead of using the cached copy.
    Refresh,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where configuration, secrets and the cache are held. Defaults to
    /// ~/quick-entry
    #[arg(long, env = "QUICK_ENTRY_HOME", default_value_t = default_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// (Not shown): Args for the `quick-entry init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The path to the service account JSON key. This file will be moved to the default secrets
    /// location in the data directory.
    #[arg(long)]
    secrets: PathBuf,

    /// The URL of your spreadsheet. It looks like this:
    /// https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
    #[arg(long, conflicts_with = "sheet_name", required_unless_present = "sheet_name")]
    sheet_url: Option<String>,

    /// The title of your spreadsheet, as an alternative to --sheet-url.
    #[arg(long)]
    sheet_name: Option<String>,
}

impl InitArgs {
    pub fn new(
        secrets: impl Into<PathBuf>,
        sheet_url: Option<String>,
        sheet_name: Option<String>,
    ) -> Self {
        Self {
            secrets: secrets.into(),
            sheet_url,
            sheet_name,
        }
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    pub fn sheet_url(&self) -> Option<&str> {
        self.sheet_url.as_deref()
    }

    pub fn sheet_name(&self) -> Option<&str> {
        self.sheet_name.as_deref()
    }
}

/// (Not shown): Args for the `quick-entry form` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct FormArgs {
    /// The transaction type: EXPENSE, INCOME, TRNSFR or INVST.
    #[arg(long = "type", value_enum, default_value_t)]
    transaction_type: TransactionType,

    /// For transfers, the account to debit. The "to" options leave it out.
    #[arg(long)]
    from: Option<String>,

    /// For transfers, show the fee field.
    #[arg(long)]
    fee: bool,
}

impl FormArgs {
    pub fn new(transaction_type: TransactionType, from: Option<String>, fee: bool) -> Self {
        Self {
            transaction_type,
            from,
            fee,
        }
    }

    /// The form state these choices describe.
    pub fn form_state(&self) -> FormState {
        FormState {
            transaction_type: self.transaction_type,
            from_account: self.from.clone(),
            fee: self.fee.then_some(Amount::ZERO),
            ..FormState::default()
        }
    }
}

/// (Not shown): Args for the `quick-entry add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The transaction type: EXPENSE, INCOME, TRNSFR or INVST.
    #[arg(long = "type", value_enum)]
    transaction_type: TransactionType,

    /// The amount as a positive number. EXPENSE and INVST are recorded as negative automatically.
    #[arg(long)]
    amount: Amount,

    /// The date as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// The category. Defaults to the first category of the type. Not used for TRNSFR.
    #[arg(long)]
    category: Option<String>,

    /// A free-text note.
    #[arg(long, default_value = "")]
    note: String,

    /// The account. Defaults to the first account. Not used for TRNSFR.
    #[arg(long)]
    account: Option<String>,

    /// For TRNSFR, the account to debit. Defaults to the first account.
    #[arg(long)]
    from: Option<String>,

    /// For TRNSFR, the account to credit. Defaults to the first account other than --from.
    #[arg(long)]
    to: Option<String>,

    /// For TRNSFR, a fee added to the amount debited from --from.
    #[arg(long)]
    fee: Option<Amount>,

    /// Reload the accounts and categories from the spreadsheet before adding.
    #[arg(long)]
    refresh: bool,
}

impl AddArgs {
    pub fn new(transaction_type: TransactionType, amount: Amount) -> Self {
        Self {
            transaction_type,
            amount,
            date: None,
            category: None,
            note: String::new(),
            account: None,
            from: None,
            to: None,
            fee: None,
            refresh: false,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn with_transfer(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        fee: Option<Amount>,
    ) -> Self {
        self.from = Some(from.into());
        self.to = Some(to.into());
        self.fee = fee;
        self
    }

    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn refresh(&self) -> bool {
        self.refresh
    }

    /// The form state these arguments fill in.
    pub fn form_state(&self) -> FormState {
        FormState {
            date: self.date,
            transaction_type: self.transaction_type,
            category: self.category.clone(),
            note: self.note.clone(),
            account: self.account.clone(),
            from_account: self.from.clone(),
            to_account: self.to.clone(),
            amount: self.amount,
            fee: self.fee,
        }
    }
}

fn default_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("quick-entry"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or QUICK_ENTRY_HOME instead of relying on the default \
                home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("quick-entry")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("quick-entry").chain(args.iter().copied()))
    }

    #[test]
    fn test_init_requires_exactly_one_sheet() {
        assert!(parse(&["init", "--secrets", "k.json"]).is_err());
        assert!(parse(&[
            "init",
            "--secrets",
            "k.json",
            "--sheet-url",
            "https://docs.google.com/spreadsheets/d/x",
            "--sheet-name",
            "y"
        ])
        .is_err());
        let args = parse(&["init", "--secrets", "k.json", "--sheet-name", "Budget"]).unwrap();
        let Command::Init(init) = args.command() else {
            panic!("expected init");
        };
        assert_eq!(init.sheet_name(), Some("Budget"));
        assert_eq!(init.sheet_url(), None);
    }

    #[test]
    fn test_add_args_to_form_state() {
        let args = parse(&[
            "--home",
            "/tmp/qe",
            "add",
            "--type",
            "trnsfr",
            "--amount",
            "1,000.5",
            "--date",
            "2026-10-15",
            "--from",
            "Cash",
            "--to",
            "Bank",
            "--fee",
            "15",
        ])
        .unwrap();
        assert_eq!(args.common().home().path(), Path::new("/tmp/qe"));
        let Command::Add(add) = args.command() else {
            panic!("expected add");
        };
        let state = add.form_state();
        assert_eq!(state.transaction_type, TransactionType::Transfer);
        assert_eq!(state.amount, "1000.50".parse().unwrap());
        assert_eq!(state.date, NaiveDate::from_ymd_opt(2026, 10, 15));
        assert_eq!(state.from_account.as_deref(), Some("Cash"));
        assert_eq!(state.to_account.as_deref(), Some("Bank"));
        assert_eq!(state.fee, Some("15".parse().unwrap()));
        assert!(!add.refresh());
    }

    #[test]
    fn test_add_rejects_negative_amount() {
        assert!(parse(&["add", "--type", "EXPENSE", "--amount=-5"]).is_err());
        assert!(parse(&["add", "--type", "EXPENSE", "--amount=₱-5"]).is_err());
        assert!(parse(&["add", "--type", "EXPENSE", "--amount", "abc12"]).is_err());
    }

    #[test]
    fn test_form_defaults_to_expense() {
        let args = parse(&["form"]).unwrap();
        let Command::Form(form) = args.command() else {
            panic!("expected form");
        };
        let state = form.form_state();
        assert_eq!(state.transaction_type, TransactionType::Expense);
        assert_eq!(state.fee, None);
    }

    #[test]
    fn test_log_level() {
        let args = parse(&["--log-level", "debug", "recent"]).unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
        assert!(matches!(args.command(), Command::Recent));
    }
}
