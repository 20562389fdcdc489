//! Storage key derivation
//!
//! Both the transfer pipeline and the verifier resolve keys through
//! [`KeyMapper`], which delegates to [`derive_key`]. A key written during a
//! transfer must be found again, byte for byte, during verification.
//!
//! Layout: `{prefix}/{sanitized title} - {video id}`, or `{prefix}/{video id}`
//! when nothing of the title survives sanitization.

use unicode_normalization::UnicodeNormalization;

use crate::app::models::{StorageKey, VideoRecord};
use crate::constants::storage;

/// Derive the storage key of a video
///
/// Pure and total: the same inputs always produce the same key.
pub fn derive_key(prefix: &str, video_id: &str, title: &str) -> StorageKey {
    let name = match sanitize_title(title) {
        Some(clean) => format!("{}{}{}", clean, storage::TITLE_ID_SEPARATOR, video_id),
        None => video_id.to_string(),
    };

    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        StorageKey::new(name)
    } else {
        StorageKey::new(format!("{}/{}", prefix, name))
    }
}

/// Reduce a title to the characters allowed in a key
///
/// Titles are decomposed first so accented letters keep their base letter
/// (`É` becomes `E`); then everything outside ASCII letters, digits, `-`,
/// `.` and whitespace is dropped and whitespace runs collapse to one space.
/// Returns `None` when nothing is left.
pub fn sanitize_title(title: &str) -> Option<String> {
    let kept: String = title.nfd().filter(|c| is_key_safe(*c)).collect();
    let collapsed = kept.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

fn is_key_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '.' || c.is_whitespace()
}

/// Key derivation bound to the configured prefix
#[derive(Debug, Clone)]
pub struct KeyMapper {
    prefix: String,
}

impl KeyMapper {
    /// Create a mapper for the given key prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Key under which `record` is stored
    pub fn key_for(&self, record: &VideoRecord) -> StorageKey {
        derive_key(&self.prefix, &record.video_id, &record.title)
    }

    /// Prefix used for store listings
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for KeyMapper {
    fn default() -> Self {
        Self::new(storage::DEFAULT_PREFIX)
    }
}
