//! Video catalog access
//!
//! The catalog is the remote inventory of videos to migrate. It is consumed
//! through the [`VideoCatalog`] trait so the pipeline and the verifier do not
//! depend on HTTP details; [`CatalogClient`] is the HTTP implementation.
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: rate-limited, authenticated JSON requests
//! - `types`: wire representation of catalog responses

use async_trait::async_trait;
use url::Url;

use crate::app::models::VideoRecord;
use crate::constants::catalog;
use crate::errors::{CatalogError, CatalogResult};

pub mod config;
pub mod http;
pub mod types;

pub use config::ClientConfig;

use http::HttpHandler;
use types::{VideoDetail, VideoPage};

/// Read access to the remote video catalog
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    /// One listing page (1-based) of at most [`catalog::PAGE_SIZE`] records
    ///
    /// Listing records carry identifier and title only.
    async fn list_page(&self, page: u32) -> CatalogResult<Vec<VideoRecord>>;

    /// Full record of one video, with its source URL when one exists
    async fn get_detail(&self, video_id: &str) -> CatalogResult<VideoRecord>;
}

/// Materialize the whole catalog
///
/// Pages are requested from page 1 until one comes back shorter than the
/// page size or empty. Any page failure aborts the listing.
pub async fn list_all<C>(catalog: &C) -> CatalogResult<Vec<VideoRecord>>
where
    C: VideoCatalog + ?Sized,
{
    let mut records = Vec::new();
    let mut page = catalog::FIRST_PAGE;

    loop {
        let batch = catalog.list_page(page).await?;
        let batch_len = batch.len();
        tracing::debug!("Catalog page {} returned {} videos", page, batch_len);
        records.extend(batch);

        if batch_len < catalog::PAGE_SIZE {
            break;
        }
        page += 1;
    }

    tracing::info!("Catalog lists {} videos across {} pages", records.len(), page);
    Ok(records)
}

/// HTTP client for the video catalog API
#[derive(Debug)]
pub struct CatalogClient {
    http_handler: HttpHandler,
    base_url: Url,
}

impl CatalogClient {
    /// Creates a catalog client for `base_url` authenticated with `api_key`
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the URL is unusable, the HTTP client cannot be
    /// built or the rate limit is zero
    pub fn new(base_url: &str, api_key: &str, config: &ClientConfig) -> CatalogResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| CatalogError::InvalidUrl {
            url: base_url.to_string(),
            error: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidUrl {
                url: base_url.to_string(),
                error: "URL cannot carry a path".to_string(),
            });
        }

        let client = config
            .build_catalog_client()
            .map_err(CatalogError::ClientBuild)?;
        let http_handler = HttpHandler::new(client, api_key.to_string(), config.rate_limit_rps)?;

        tracing::info!("Created catalog client for {}", base_url);

        Ok(Self {
            http_handler,
            base_url,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl VideoCatalog for CatalogClient {
    async fn list_page(&self, page: u32) -> CatalogResult<Vec<VideoRecord>> {
        let mut url = self.endpoint(&["videos"]);
        url.query_pairs_mut()
            .append_pair("currentPage", &page.to_string())
            .append_pair("pageSize", &catalog::PAGE_SIZE.to_string());

        let body: VideoPage = self
            .http_handler
            .get_json(&url)
            .await
            .map_err(|source| CatalogError::List { page, source })?;

        Ok(body.data.into_iter().map(VideoRecord::from).collect())
    }

    async fn get_detail(&self, video_id: &str) -> CatalogResult<VideoRecord> {
        let url = self.endpoint(&["videos", video_id]);

        let detail: VideoDetail =
            self.http_handler
                .get_json(&url)
                .await
                .map_err(|source| CatalogError::Detail {
                    video_id: video_id.to_string(),
                    source,
                })?;

        Ok(VideoRecord::from(detail))
    }
}
