//! Command handlers for the quick-entry CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod add;
mod form;
mod init;
mod recent;
mod refresh;

use crate::api::{Mode, Session};
use crate::cache::ReferenceCache;
use crate::error::{ErrorType, IntoResult};
use crate::model::ReferenceData;
use crate::{Config, Result};
use anyhow::Context;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info, warn};

pub use add::{add, Added};
pub use form::form;
pub use init::init;
pub use recent::recent;
pub use refresh::refresh;

/// The output type for a command. This allows the command to return a consistent message,
/// optionally structured data, and any warnings that did not stop it.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,

    /// Problems that degraded the result without failing the command.
    warnings: Vec<String>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
            warnings: Vec::new(),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
            warnings: Vec::new(),
        }
    }

    /// Adds `warnings` to those already held.
    pub fn with_warnings<I>(mut self, warnings: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.warnings.extend(warnings);
        self
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Print each warning to `warn!`, the message to `info!` and the structured data (if it
    /// exists) as JSON to `debug!`.
    pub fn print(&self) {
        for warning in &self.warnings {
            warn!("{warning}");
        }
        if !self.message.is_empty() {
            info!("{}", self.message);
        }
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Loads the credentials. Nothing else can happen without them.
async fn start(config: Config, mode: Mode) -> Result<Session> {
    Session::start(config, mode)
        .await
        .context("Unable to load the service account credentials")
        .pub_result(ErrorType::Config)
}

/// Loads the reference data through the cache, or reloads it when `refresh` is true.
async fn reference(session: &Session, refresh: bool) -> Result<ReferenceData> {
    let cache = ReferenceCache::from_config(session.config());
    let mut ledger = session
        .ledger()
        .await
        .with_context(|| format!("Unable to open the {}", session.config().spreadsheet()))
        .pub_result(ErrorType::Read)?;
    let now = Utc::now();
    let loaded = if refresh {
        cache.refresh(ledger.as_mut(), now).await
    } else {
        cache.get_or_load(ledger.as_mut(), now).await
    };
    loaded
        .context("Unable to load the accounts from the spreadsheet")
        .pub_result(ErrorType::Read)
}

/// The default transaction date: today in local time.
fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
