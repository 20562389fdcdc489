//! Destination object store
//!
//! The pipeline and the verifier talk to the store through [`ObjectStore`];
//! [`S3Store`] implements it for any S3-compatible service.
//!
//! - `s3`: client construction, existence checks and listings
//! - `upload`: streaming multipart upload with one part in flight

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::app::models::StorageKey;
use crate::constants::transfer;
use crate::errors::{StoreResult, TransferResult};

pub mod s3;
pub mod upload;

pub use s3::S3Store;

/// Ordered, finite sequence of payload chunks
///
/// Not restartable: a retry must re-open the source.
pub type ByteStream = BoxStream<'static, TransferResult<Bytes>>;

/// Operations the migration needs from the destination
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Whether `key` is present
    ///
    /// Never fails: anything other than a clear answer counts as absent, so
    /// an ambiguous check costs a re-upload instead of a skipped video.
    async fn exists(&self, key: &StorageKey) -> bool;

    /// Stream `body` into `key`, returning the number of bytes committed
    async fn put_stream(
        &self,
        key: &StorageKey,
        body: ByteStream,
        size_hint: Option<u64>,
    ) -> TransferResult<u64>;

    /// Every key under `prefix`
    async fn list_keys(&self, prefix: &str) -> StoreResult<Vec<String>>;
}

/// Connection settings for the destination store
#[derive(Clone)]
pub struct StoreSettings {
    /// Bucket receiving the videos
    pub bucket: String,
    /// Bucket region
    pub region: String,
    /// Access key id
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Custom endpoint for S3-compatible services; enables path-style URLs
    pub endpoint: Option<String>,
    /// Multipart part size in bytes
    pub part_size: usize,
}

impl StoreSettings {
    /// Settings with the default part size and no custom endpoint
    pub fn new(
        bucket: impl Into<String>,
        region: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            endpoint: None,
            part_size: transfer::PART_SIZE,
        }
    }
}

impl fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreSettings")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("part_size", &self.part_size)
            .finish()
    }
}

/// Listing prefix covering every key written under `key_prefix`
pub fn listing_prefix(key_prefix: &str) -> String {
    let trimmed = key_prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}/", trimmed)
    }
}
