use clap::Parser;
use quick_entry::args::{Args, Command};
use quick_entry::{commands, Config, Error, ErrorType, Mode, Result};
use std::path::Path;
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, trace};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with {} error: {e}", e.error_type());
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();

    // This allows for testing the program without hitting the Google APIs. When
    // QUICK_ENTRY_IN_TEST_MODE is set and non-zero in length, then the mode will be Mode::Test,
    // otherwise it will be Mode::Google.
    let mode = Mode::from_env();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(
            home,
            init_args.secrets(),
            init_args.sheet_url(),
            init_args.sheet_name(),
        )
        .await?
        .print(),

        Command::Form(form_args) => {
            let config = load_config(home).await?;
            commands::form(config, mode, form_args.clone())
                .await?
                .print()
        }

        Command::Add(add_args) => {
            let config = load_config(home).await?;
            commands::add(config, mode, *add_args.clone())
                .await?
                .print()
        }

        Command::Recent => {
            let config = load_config(home).await?;
            commands::recent(config, mode).await?.print()
        }

        Command::Refresh => {
            let config = load_config(home).await?;
            commands::refresh(config, mode).await?.print()
        }
    };
    Ok(())
}

/// Loads the config, which every command except `init` needs.
async fn load_config(home: &Path) -> Result<Config> {
    Config::load(home)
        .await
        .map_err(|e| Error::new(ErrorType::Config, e))
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
