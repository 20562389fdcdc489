//! Failure ledger persistence
//!
//! The ledger is the only state kept between runs: a pretty-printed JSON
//! array of the videos that failed the last run (or that the last
//! verification found missing). It is replaced wholesale, never appended to,
//! and removed once a run finishes without failures.
//!
//! Writes go through a temporary file followed by a rename so an interrupted
//! save never leaves a truncated ledger behind.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::app::models::VideoRecord;
use crate::constants::files;
use crate::errors::{LedgerError, LedgerResult};

/// One failed video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub video_id: String,
    pub title: String,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

impl LedgerEntry {
    /// Record a failure of `record` now
    pub fn new(record: &VideoRecord, error: impl Into<String>) -> Self {
        Self::at(record, error, Utc::now())
    }

    /// Record a failure of `record` at `timestamp`
    pub fn at(record: &VideoRecord, error: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            video_id: record.video_id.clone(),
            title: record.title.clone(),
            error: error.into(),
            timestamp,
        }
    }

    /// Minimal record that re-enters the pipeline before the detail fetch
    pub fn to_record(&self) -> VideoRecord {
        VideoRecord::new(self.video_id.clone(), self.title.clone())
    }
}

/// Handle on the ledger file
#[derive(Debug, Clone)]
pub struct FailureLedger {
    path: PathBuf,
}

impl FailureLedger {
    /// Ledger stored at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the ledger file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the ledger
    ///
    /// A missing ledger means nothing to retry. So does a corrupt or
    /// unreadable one, which is logged and otherwise ignored.
    pub async fn load(&self) -> Vec<LedgerEntry> {
        match self.try_load().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("{}; treating it as empty", e);
                Vec::new()
            }
        }
    }

    async fn try_load(&self) -> LedgerResult<Vec<LedgerEntry>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No ledger at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(LedgerError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let entries: Vec<LedgerEntry> =
            serde_json::from_str(&content).map_err(|source| LedgerError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        debug!("Loaded {} ledger entries from {}", entries.len(), self.path.display());
        Ok(entries)
    }

    /// Replace the ledger with `entries`
    ///
    /// An empty set clears the ledger instead of writing an empty file.
    pub async fn save(&self, entries: &[LedgerEntry]) -> LedgerResult<()> {
        if entries.is_empty() {
            return self.clear().await;
        }

        let json = serde_json::to_string_pretty(entries).map_err(LedgerError::Serialize)?;
        let temp_path = self.temp_path();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }

        tokio::fs::write(&temp_path, json)
            .await
            .map_err(|source| self.io_error(source))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|source| self.io_error(source))?;

        info!(
            "Wrote {} entries to failure ledger {}",
            entries.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Delete the ledger; a missing ledger is not an error
    pub async fn clear(&self) -> LedgerResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!("Cleared failure ledger {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(files::TEMP_FILE_SUFFIX);
        PathBuf::from(name)
    }

    fn io_error(&self, source: std::io::Error) -> LedgerError {
        LedgerError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
