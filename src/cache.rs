//! Caches the reference data (headers, accounts and categories) read from the spreadsheet.
//!
//! Every command runs in a new process, so the cache lives in `$QUICK_ENTRY_HOME/.cache` as a JSON
//! file. Each query is stored with the time it was fetched and the spreadsheet it came from. An
//! entry is reused until it is `ttl` seconds old.

use crate::api::Ledger;
use crate::error::Res;
use crate::model::{CategoryData, HeaderData, ReferenceData};
use crate::{utils, Config};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One cached query result.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Cached<T> {
    source: String,
    fetched_at: DateTime<Utc>,
    data: T,
}

impl<T> Cached<T> {
    fn new(source: &str, fetched_at: DateTime<Utc>, data: T) -> Self {
        Self {
            source: source.to_string(),
            fetched_at,
            data,
        }
    }

    fn is_fresh(&self, source: &str, now: DateTime<Utc>, ttl_secs: u64) -> bool {
        let age = (now - self.fetched_at).num_seconds();
        self.source == source && age >= 0 && age.unsigned_abs() < ttl_secs
    }
}

/// The on-disk format, one entry per query.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    #[serde(default)]
    headers: Option<Cached<HeaderData>>,
    #[serde(default)]
    categories: Option<Cached<CategoryData>>,
}

/// The reference data cache for one spreadsheet.
#[derive(Debug, Clone)]
pub(crate) struct ReferenceCache {
    path: PathBuf,
    ttl_secs: u64,
    source: String,
}

impl ReferenceCache {
    pub(crate) fn new(path: impl Into<PathBuf>, ttl_secs: u64, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ttl_secs,
            source: source.into(),
        }
    }

    /// The cache described by `config`.
    pub(crate) fn from_config(config: &Config) -> Self {
        Self::new(
            config.reference_cache_path(),
            config.cache_ttl_secs(),
            config.spreadsheet().key(),
        )
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the reference data, reading from `ledger` only the queries that are missing or
    /// stale.
    ///
    /// # Errors
    /// Returns an error if the header row cannot be read. A failure to read the categories is
    /// returned as a warning with empty category lists, and is not cached.
    pub(crate) async fn get_or_load(
        &self,
        ledger: &mut (dyn Ledger + Send),
        now: DateTime<Utc>,
    ) -> Res<ReferenceData> {
        let mut file = self.read().await;
        let mut changed = false;
        let mut warnings = Vec::new();

        let header = match file
            .headers
            .as_ref()
            .filter(|c| c.is_fresh(&self.source, now, self.ttl_secs))
        {
            Some(cached) => {
                debug!("Using cached headers from {}", cached.fetched_at);
                cached.data.clone()
            }
            None => {
                let data = ledger.header().await?;
                file.headers = Some(Cached::new(&self.source, now, data.clone()));
                changed = true;
                data
            }
        };

        let categories = match file
            .categories
            .as_ref()
            .filter(|c| c.is_fresh(&self.source, now, self.ttl_secs))
        {
            Some(cached) => {
                debug!("Using cached categories from {}", cached.fetched_at);
                cached.data.clone()
            }
            None => match ledger.categories().await {
                Ok(data) => {
                    file.categories = Some(Cached::new(&self.source, now, data.clone()));
                    changed = true;
                    data
                }
                Err(e) => {
                    warnings.push(format!("Could not load categories from Stat tab: {e:#}"));
                    CategoryData::default()
                }
            },
        };

        if changed {
            if let Err(e) = self.write(&file).await {
                warn!("Unable to save the reference data cache: {e:#}");
            }
        }

        Ok(ReferenceData {
            header,
            categories,
            warnings,
        })
    }

    /// Forgets everything cached.
    pub(crate) async fn invalidate(&self) -> Res<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("Removed {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Unable to remove the cache {}", self.path.display())),
        }
    }

    /// Forgets everything cached and loads it again.
    pub(crate) async fn refresh(
        &self,
        ledger: &mut (dyn Ledger + Send),
        now: DateTime<Utc>,
    ) -> Res<ReferenceData> {
        self.invalidate().await?;
        self.get_or_load(ledger, now).await
    }

    async fn read(&self) -> CacheFile {
        if !self.path.is_file() {
            return CacheFile::default();
        }
        match utils::deserialize(&self.path).await {
            Ok(file) => file,
            Err(e) => {
                warn!(
                    "Ignoring the unreadable reference data cache {}: {e:#}",
                    self.path().display()
                );
                CacheFile::default()
            }
        }
    }

    async fn write(&self, file: &CacheFile) -> Res<()> {
        let data = serde_json::to_string_pretty(file).context("Unable to serialize the cache")?;
        utils::write(&self.path, data).await
    }
}
