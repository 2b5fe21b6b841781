//! Configuration file handling for quick-entry.
//!
//! The configuration file is stored at `$QUICK_ENTRY_HOME/config.json` and names the spreadsheet,
//! the service account secrets, the currency symbol, the reference data cache lifetime and the
//! spreadsheet layout.

use crate::error::Res;
use crate::model::{Layout, DEFAULT_CURRENCY};
use crate::utils;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use url::Url;

const APP_NAME: &str = "quick-entry";
const CONFIG_VERSION: u8 = 1;
const SECRETS: &str = ".secrets";
const CACHE: &str = ".cache";
const SERVICE_ACCOUNT_JSON: &str = "service_account.json";
const CONFIG_JSON: &str = "config.json";
const REFERENCE_JSON: &str = "reference.json";
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// How the spreadsheet is identified.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Spreadsheet {
    /// The ID from the spreadsheet URL.
    Id(String),
    /// The title of the spreadsheet, looked up in Google Drive when it is opened.
    Name(String),
}

impl Spreadsheet {
    /// The ID or the name, whichever identifies the spreadsheet.
    pub fn key(&self) -> &str {
        match self {
            Spreadsheet::Id(id) => id,
            Spreadsheet::Name(name) => name,
        }
    }
}

impl Display for Spreadsheet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Spreadsheet::Id(id) => write!(f, "spreadsheet {id}"),
            Spreadsheet::Name(name) => write!(f, "spreadsheet named '{name}'"),
        }
    }
}

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$QUICK_ENTRY_HOME` and from there it loads `$QUICK_ENTRY_HOME/config.json`. It
/// provides paths to other items that are either configurable or are expected in a certain location
/// within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    secrets: PathBuf,
    cache: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    spreadsheet: Spreadsheet,
}

impl Config {
    /// Creates the data directory, its subdirectories and:
    /// - Creates an initial `config.json` file naming the spreadsheet along with default settings
    /// - Moves `secrets_file` into its default location in the data dir and makes it private
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/quick-entry`
    /// - `secrets_file` - The service account key JSON downloaded from the Google Cloud Console.
    /// - `sheet_url` - The URL of the finance spreadsheet, e.g.
    ///   https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
    /// - `sheet_name` - The title of the finance spreadsheet, used when `sheet_url` is `None`.
    ///
    /// # Errors
    /// - Neither or both of `sheet_url` and `sheet_name` are given, or the URL is not a Google
    ///   Sheets URL.
    /// - Any file operation fails.
    pub async fn create(
        dir: impl Into<PathBuf>,
        secrets_file: &Path,
        sheet_url: Option<&str>,
        sheet_name: Option<&str>,
    ) -> Res<Self> {
        let config_file = ConfigFile {
            sheet_url: sheet_url.map(str::to_string),
            sheet_name: sheet_name.map(str::to_string),
            ..ConfigFile::default()
        };
        let spreadsheet = config_file.spreadsheet()?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the quick-entry home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let secrets_dir = root.join(SECRETS);
        utils::make_dir(&secrets_dir).await?;
        let cache_dir = root.join(CACHE);
        utils::make_dir(&cache_dir).await?;

        let secrets_destination = secrets_dir.join(SERVICE_ACCOUNT_JSON);
        utils::rename(secrets_file, &secrets_destination).await?;
        utils::set_private(&secrets_destination)?;

        let config_path = root.join(CONFIG_JSON);
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            secrets: secrets_dir,
            cache: cache_dir,
            config_path,
            config_file,
            spreadsheet,
        })
    }

    /// This will
    /// - validate that `home` exists and that the config file exists
    /// - load and validate the config file
    /// - validate that the secrets directory exists
    /// - create the cache directory if it is missing
    pub async fn load(home: impl Into<PathBuf>) -> Res<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The quick-entry home directory is missing, run 'quick-entry init'")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let spreadsheet = config_file.spreadsheet()?;

        let secrets = root.join(SECRETS);
        if !secrets.is_dir() {
            bail!("The secrets directory is missing '{}'", secrets.display())
        }
        let cache = root.join(CACHE);
        utils::make_dir(&cache).await?;

        Ok(Self {
            root,
            secrets,
            cache,
            config_path,
            config_file,
            spreadsheet,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    pub fn cache(&self) -> &Path {
        &self.cache
    }

    pub fn spreadsheet(&self) -> &Spreadsheet {
        &self.spreadsheet
    }

    pub fn currency(&self) -> &str {
        &self.config_file.currency
    }

    pub fn cache_ttl_secs(&self) -> u64 {
        self.config_file.cache_ttl_secs
    }

    pub fn layout(&self) -> &Layout {
        &self.config_file.layout
    }

    /// The file that holds cached reference data.
    pub fn reference_cache_path(&self) -> PathBuf {
        self.cache.join(REFERENCE_JSON)
    }

    /// Returns the stored `secrets_path` if it is absolute, otherwise resolves the relative path.
    pub fn secrets_path(&self) -> PathBuf {
        let p = self.config_file.secrets_path();
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "quick-entry",
///   "config_version": 1,
///   "sheet_url": "https://docs.google.com/spreadsheets/d/7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL",
///   "secrets_path": ".secrets/service_account.json",
///   "currency": "₱",
///   "cache_ttl_secs": 300,
///   "layout": {
///     "transactions_sheet": "TRNSX",
///     "categories_sheet": "Stat",
///     "header_row": 4
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct ConfigFile {
    /// Application name, should always be "quick-entry"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// URL of the finance spreadsheet. Takes the place of `sheet_name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sheet_url: Option<String>,

    /// Title of the finance spreadsheet. Takes the place of `sheet_url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sheet_name: Option<String>,

    /// Path to the service account secrets (optional, relative to the home directory or
    /// absolute). Defaults to $QUICK_ENTRY_HOME/.secrets/service_account.json if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    secrets_path: Option<PathBuf>,

    /// Currency symbol used when amounts are shown.
    #[serde(default = "default_currency")]
    currency: String,

    /// How long reference data read from the spreadsheet is reused before it is read again.
    #[serde(default = "default_cache_ttl_secs")]
    cache_ttl_secs: u64,

    #[serde(default)]
    layout: Layout,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            sheet_url: None,
            sheet_name: None,
            secrets_path: None,
            currency: default_currency(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            layout: Layout::default(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if its settings are invalid
    pub async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        config
            .layout
            .validate()
            .with_context(|| format!("Invalid layout in config file {}", path.display()))?;

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    /// Gets the secrets path.
    ///
    /// If None, defaults to $QUICK_ENTRY_HOME/.secrets/service_account.json
    pub fn secrets_path(&self) -> PathBuf {
        self.secrets_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(SERVICE_ACCOUNT_JSON))
    }

    /// Works out which spreadsheet the settings name. Exactly one of `sheet_url` and `sheet_name`
    /// must be set.
    fn spreadsheet(&self) -> Res<Spreadsheet> {
        let url = self.sheet_url.as_deref().filter(|s| !s.trim().is_empty());
        let name = self.sheet_name.as_deref().filter(|s| !s.trim().is_empty());
        match (url, name) {
            (Some(url), None) => Ok(Spreadsheet::Id(extract_spreadsheet_id(url)?)),
            (None, Some(name)) => Ok(Spreadsheet::Name(name.trim().to_string())),
            (Some(_), Some(_)) => bail!("Set only one of sheet_url and sheet_name"),
            (None, None) => bail!("Either sheet_url or sheet_name must be set"),
        }
    }
}

/// Extracts the spreadsheet ID from a Google Sheets URL
///
/// # Arguments
/// * `url` - The Google Sheets URL (e.g., "https://docs.google.com/spreadsheets/d/SPREADSHEET_ID/...")
///
/// # Returns
/// The spreadsheet ID or an error if the URL format is invalid.
fn extract_spreadsheet_id(url: &str) -> Res<String> {
    let parsed = Url::parse(url).with_context(|| format!("Invalid spreadsheet URL '{url}'"))?;
    let mut segments = parsed
        .path_segments()
        .with_context(|| format!("Invalid spreadsheet URL '{url}'"))?;
    while let Some(segment) = segments.next() {
        if segment == "d" {
            if let Some(id) = segments.next().filter(|id| !id.is_empty()) {
                return Ok(id.to_string());
            }
        }
    }
    bail!(
        "Invalid Google Sheets URL format. Expected: \
        https://docs.google.com/spreadsheets/d/SPREADSHEET_ID"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SHEET_URL: &str =
        "https://docs.google.com/spreadsheets/d/7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL/edit";

    #[tokio::test]
    async fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("quick_entry_home");
        let secrets_source = dir.path().join("key.json");
        let secrets_content = "{\"type\": \"service_account\"}";
        utils::write(&secrets_source, secrets_content).await.unwrap();

        let config = Config::create(&home_dir, &secrets_source, Some(SHEET_URL), None)
            .await
            .unwrap();

        assert_eq!(
            config.spreadsheet(),
            &Spreadsheet::Id("7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL".to_string())
        );
        let found = utils::read(&config.secrets_path()).await.unwrap();
        assert_eq!(secrets_content, found);
        assert!(!secrets_source.exists());
        assert!(config.secrets().is_dir());
        assert!(config.cache().is_dir());
        assert_eq!(config.currency(), "₱");
        assert_eq!(config.cache_ttl_secs(), 300);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(config.secrets_path())
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[tokio::test]
    async fn test_config_create_then_load_by_name() {
        let dir = TempDir::new().unwrap();
        let secrets_source = dir.path().join("key.json");
        utils::write(&secrets_source, "{}").await.unwrap();
        let home = dir.path().join("home");
        Config::create(&home, &secrets_source, None, Some("My Finances"))
            .await
            .unwrap();

        let config = Config::load(&home).await.unwrap();
        assert_eq!(
            config.spreadsheet(),
            &Spreadsheet::Name("My Finances".to_string())
        );
        assert_eq!(config.spreadsheet().key(), "My Finances");
        assert_eq!(config.layout(), &Layout::default());
        assert!(config.reference_cache_path().ends_with(".cache/reference.json"));
    }

    #[tokio::test]
    async fn test_config_create_requires_one_sheet() {
        let dir = TempDir::new().unwrap();
        let secrets_source = dir.path().join("key.json");
        utils::write(&secrets_source, "{}").await.unwrap();
        let home = dir.path().join("home");

        let neither = Config::create(&home, &secrets_source, None, None).await;
        assert!(neither.unwrap_err().to_string().contains("must be set"));
        let both = Config::create(&home, &secrets_source, Some(SHEET_URL), Some("x")).await;
        assert!(both.unwrap_err().to_string().contains("only one"));
        assert!(!home.exists());
    }

    #[tokio::test]
    async fn test_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nope")).await.unwrap_err();
        assert!(err.to_string().contains("home directory is missing"));
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "quick-entry",
            "config_version": 1,
            "sheet_url": "https://docs.google.com/spreadsheets/d/minimal"
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();

        assert_eq!(
            config.spreadsheet().unwrap(),
            Spreadsheet::Id("minimal".to_string())
        );
        assert_eq!(config.currency, "₱");
        assert_eq!(config.cache_ttl_secs, 300);
        assert_eq!(config.layout, Layout::default());
        assert_eq!(
            config.secrets_path(),
            PathBuf::from(SECRETS).join(SERVICE_ACCOUNT_JSON)
        );
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "wrong_app",
            "config_version": 1,
            "sheet_name": "x"
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_layout() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "quick-entry",
            "config_version": 1,
            "sheet_name": "x",
            "layout": { "header_row": 0 }
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let err = ConfigFile::load(&config_path).await.unwrap_err();
        assert!(err.to_string().contains("Invalid layout"));
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let t = TempDir::new().unwrap();
        let path = t.path().join("file.json");
        let original = ConfigFile {
            sheet_name: Some("Budget".to_string()),
            secrets_path: Some(PathBuf::from("/etc/quick-entry/key.json")),
            currency: "$".to_string(),
            cache_ttl_secs: 60,
            ..ConfigFile::default()
        };
        original.save(&path).await.unwrap();
        let read = ConfigFile::load(&path).await.unwrap();
        assert_eq!(original, read);
    }

    #[test]
    fn test_serialization_omits_none_fields() {
        let config = ConfigFile {
            sheet_url: Some(SHEET_URL.to_string()),
            ..ConfigFile::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sheet_name"));
        assert!(!json.contains("secrets_path"));
    }

    #[test]
    fn test_extract_spreadsheet_id() {
        assert_eq!(
            extract_spreadsheet_id(SHEET_URL).unwrap(),
            "7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL"
        );
        assert_eq!(
            extract_spreadsheet_id("https://docs.google.com/spreadsheets/d/ABC123?foo=bar#gid=0")
                .unwrap(),
            "ABC123"
        );
        assert!(extract_spreadsheet_id("https://example.com/invalid").is_err());
        assert!(extract_spreadsheet_id("not a url").is_err());
        assert!(extract_spreadsheet_id("https://docs.google.com/spreadsheets/d/").is_err());
    }
}
