//! Application constants for the video migrator
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Environment variable names for credentials and endpoints
pub mod env {
    /// Bearer token for the video catalog API
    pub const CATALOG_API_KEY: &str = "CATALOG_API_KEY";

    /// Optional override for the catalog API base URL
    pub const CATALOG_BASE_URL: &str = "CATALOG_BASE_URL";

    /// Region of the destination bucket
    pub const S3_REGION: &str = "S3_REGION";

    /// Access key for the destination store
    pub const S3_ACCESS_KEY_ID: &str = "S3_ACCESS_KEY_ID";

    /// Secret key for the destination store
    pub const S3_SECRET_ACCESS_KEY: &str = "S3_SECRET_ACCESS_KEY";

    /// Destination bucket name
    pub const S3_BUCKET: &str = "S3_BUCKET";

    /// Optional custom endpoint for S3-compatible stores (MinIO, R2, ...)
    pub const S3_ENDPOINT: &str = "S3_ENDPOINT";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("video-migrator/", env!("CARGO_PKG_VERSION"));

    /// Request timeout applied to catalog API calls only
    pub const CATALOG_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Jitter added to rate-limited catalog requests (milliseconds)
    pub const RATE_LIMIT_JITTER_MS: u64 = 100;
}

/// Video catalog service constants
pub mod catalog {
    /// Default catalog API base URL
    pub const DEFAULT_BASE_URL: &str = "https://ws.api.video";

    /// Items requested per listing page; a shorter page marks the last one
    pub const PAGE_SIZE: usize = 100;

    /// First page number accepted by the listing endpoint
    pub const FIRST_PAGE: u32 = 1;

    /// Default catalog request rate (requests per second)
    pub const DEFAULT_RATE_LIMIT_RPS: u32 = 10;

    /// Times a 429 response is waited out before giving up
    pub const MAX_RATE_LIMIT_RETRIES: u32 = 3;

    /// Base delay for 429 backoff (milliseconds), doubled per wait
    pub const RATE_LIMIT_BASE_DELAY_MS: u64 = 1000;
}

/// Transfer and retry configuration
pub mod transfer {
    use super::Duration;

    /// Retries after the first failed upload attempt
    pub const MAX_RETRIES: u32 = 3;

    /// Largest retry count accepted from configuration
    pub const MAX_RETRIES_LIMIT: u32 = 100;

    /// Fixed delay between upload attempts
    pub const RETRY_DELAY: Duration = Duration::from_secs(5);

    /// Multipart upload part size (10 MiB)
    pub const PART_SIZE: usize = 10 * 1024 * 1024;

    /// Smallest part size S3 accepts for non-final parts (5 MiB)
    pub const MIN_PART_SIZE: usize = 5 * 1024 * 1024;

    /// Content type recorded on uploaded objects
    pub const CONTENT_TYPE: &str = "video/mp4";
}

/// Object storage constants
pub mod storage {
    /// Key prefix under which every video is stored
    pub const DEFAULT_PREFIX: &str = "videos";

    /// Separator between the sanitized title and the identifier
    pub const TITLE_ID_SEPARATOR: &str = " - ";
}

/// File operation constants
pub mod files {
    /// Default failure ledger location (relative to the working directory)
    pub const LEDGER_FILE_NAME: &str = "failed-transfers.json";

    /// Temporary file suffix for atomic ledger writes
    pub const TEMP_FILE_SUFFIX: &str = ".tmp";

    /// Project-local configuration file name
    pub const LOCAL_CONFIG_FILE: &str = "video-migrator.toml";

    /// Directory name under the user config dir
    pub const CONFIG_DIR_NAME: &str = "video-migrator";
}

/// Progress reporting constants
pub mod progress {
    /// Spinner tick interval (milliseconds)
    pub const SPINNER_TICK_MS: u64 = 120;

    /// Maximum title width shown next to the progress bar
    pub const MAX_TITLE_WIDTH: usize = 40;
}

// Re-export commonly used constants for convenience
pub use catalog::PAGE_SIZE;
pub use files::LEDGER_FILE_NAME;
pub use http::USER_AGENT;
pub use transfer::{MAX_RETRIES, PART_SIZE, RETRY_DELAY};
