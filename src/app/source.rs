//! Source media streaming
//!
//! Opens a video's source URL as a byte stream that is handed straight to the
//! store. Nothing is written to local disk.

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::Client;
use url::Url;

use crate::app::catalog::ClientConfig;
use crate::app::store::ByteStream;
use crate::errors::{TransferError, TransferResult};

/// An opened source, ready to be consumed once
pub struct SourceStream {
    /// Payload chunks in order
    pub body: ByteStream,
    /// Length announced by the source, if any
    pub content_length: Option<u64>,
}

impl std::fmt::Debug for SourceStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceStream")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Something that can open a source URL for reading
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Open `url` for streaming
    ///
    /// A non-success status is an error of this attempt, never an empty
    /// stream.
    async fn open(&self, url: &str) -> TransferResult<SourceStream>;
}

/// Source reader over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    /// Build a source reader; no overall request timeout is applied
    pub fn new(config: &ClientConfig) -> reqwest::Result<Self> {
        Ok(Self {
            client: config.build_source_client()?,
        })
    }
}

#[async_trait]
impl MediaSource for HttpSource {
    async fn open(&self, url: &str) -> TransferResult<SourceStream> {
        let parsed = Url::parse(url).map_err(|e| TransferError::SourceFetch {
            url: url.to_string(),
            reason: format!("invalid URL: {}", e),
        })?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| TransferError::SourceFetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::SourceStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_length = response.content_length();
        let stream_url = url.to_string();
        let body = response
            .bytes_stream()
            .map_err(move |e| TransferError::SourceFetch {
                url: stream_url.clone(),
                reason: e.to_string(),
            })
            .boxed();

        tracing::debug!("Opened source {} (length: {:?})", url, content_length);
        Ok(SourceStream {
            body,
            content_length,
        })
    }
}
