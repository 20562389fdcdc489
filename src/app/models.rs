//! Data models for the video migrator
//!
//! This module defines the core data structures shared by the catalog client,
//! the transfer pipeline and the verifier.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A video as known to the catalog
///
/// Listing pages only carry the identifier and title; `source_url` is filled
/// by a detail fetch. A `None` source after the detail fetch means the video
/// has no transferable asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Opaque identifier assigned by the catalog
    pub video_id: String,
    /// Free-text title, possibly empty
    pub title: String,
    /// Resolved source media URL
    pub source_url: Option<String>,
}

impl VideoRecord {
    /// Create a record with no resolved source
    pub fn new(video_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            title: title.into(),
            source_url: None,
        }
    }

    /// Attach a source URL
    pub fn with_source(mut self, source_url: impl Into<String>) -> Self {
        self.source_url = Some(source_url.into());
        self
    }

    /// Short human-readable label used in progress output
    pub fn label(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.video_id
        } else {
            &self.title
        }
    }
}

/// Destination key of a video in the object store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StorageKey(String);

impl StorageKey {
    pub(crate) fn new(key: String) -> Self {
        Self(key)
    }

    /// Borrow the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Why a video was not uploaded without it counting as a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The destination key is already present
    AlreadyExists,
    /// The catalog has no source media for this video
    NoSourceUrl,
    /// Would have been uploaded, but this is a dry run
    DryRun,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyExists => write!(f, "already exists"),
            SkipReason::NoSourceUrl => write!(f, "no source url"),
            SkipReason::DryRun => write!(f, "dry run"),
        }
    }
}

/// Terminal result of one video within one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Upload committed
    Success { key: StorageKey, bytes: u64 },
    /// Nothing to do for this video
    Skipped(SkipReason),
    /// Gave up on this video
    Failed {
        error: String,
        attempts: u32,
        timestamp: DateTime<Utc>,
    },
}

impl TransferOutcome {
    /// Whether this outcome belongs in the failure ledger
    pub fn is_failure(&self) -> bool {
        matches!(self, TransferOutcome::Failed { .. })
    }
}
