use crate::api::Credentials;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its subdirectories and:
/// - Creates an initial `config.json` file naming the spreadsheet along with default settings
/// - Moves `secrets_file` into its default location in the data dir.
///
/// # Arguments
/// - `home` - The directory that will be the root of data directory, e.g. `$HOME/quick-entry`
/// - `secrets_file` - The service account JSON key. It is checked before anything is created.
/// - `sheet_url` - The URL of the spreadsheet.
/// - `sheet_name` - The title of the spreadsheet, when `sheet_url` is not given.
///
/// # Errors
/// - The secrets are not a complete service account key.
/// - Neither or both of `sheet_url` and `sheet_name` are given.
/// - Any file operation fails.
pub async fn init(
    home: &Path,
    secrets_file: &Path,
    sheet_url: Option<&str>,
    sheet_name: Option<&str>,
) -> Result<Out<()>> {
    let credentials = Credentials::load(secrets_file)
        .await
        .pub_result(ErrorType::Config)?;
    let config = Config::create(home, secrets_file, sheet_url, sheet_name)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created {} for the {}. Make sure the spreadsheet is shared with {}",
        config.root().display(),
        config.spreadsheet(),
        credentials.client_email()
    )
    .into())
}
