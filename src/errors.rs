//! Error types for the video migrator
//!
//! Errors are grouped by the component that raises them. Only two classes are
//! allowed to abort a run: configuration errors (before any work starts) and
//! catalog listing errors (an incomplete catalog cannot be reconciled). Every
//! other failure is caught at the item boundary and turned into a ledger entry.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// One or more required settings are absent
    #[error("Missing required configuration: {}", missing.join(", "))]
    MissingSettings { missing: Vec<String> },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Configuration file could not be read
    #[error("Failed to read configuration file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Failures of a single catalog HTTP request
#[derive(Error, Debug)]
pub enum HttpError {
    /// Connection or transport failure
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Server answered with a non-success status
    #[error("server returned HTTP {status}")]
    Status { status: u16 },

    /// Server kept answering 429 after every backoff
    #[error("rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// Body was not the expected JSON document
    #[error("invalid response body: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Video catalog errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Listing a page failed; the whole run is aborted
    #[error("Catalog listing failed on page {page}: {source}")]
    List {
        page: u32,
        #[source]
        source: HttpError,
    },

    /// Fetching a single video's detail failed
    #[error("Failed to fetch detail for video {video_id}: {source}")]
    Detail {
        video_id: String,
        #[source]
        source: HttpError,
    },

    /// HTTP client could not be built
    #[error("Failed to build catalog HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    /// Rate limit configured as zero
    #[error("Catalog rate limit must be greater than zero")]
    ZeroRateLimit,

    /// Invalid catalog URL
    #[error("Invalid catalog URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },
}

/// Object store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Upload (part, completion or single put) was rejected
    #[error("Failed to commit {key} to the store: {reason}")]
    Commit { key: String, reason: String },

    /// Bucket listing failed
    #[error("Failed to list store keys under '{prefix}': {reason}")]
    List { prefix: String, reason: String },

    /// Store client configuration error
    #[error("Store configuration error: {0}")]
    Config(String),
}

/// Errors raised while moving bytes from the source to the store
#[derive(Error, Debug)]
pub enum TransferError {
    /// Source returned a non-success status
    #[error("Source returned HTTP {status} for {url}")]
    SourceStatus { status: u16, url: String },

    /// Transport failure while opening or reading the source
    #[error("Failed to read source {url}: {reason}")]
    SourceFetch { url: String, reason: String },

    /// Destination rejected the upload
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure ledger errors
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Ledger exists but is not a valid entry list
    #[error("Failure ledger {path} is corrupt")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Ledger could not be serialized
    #[error("Failed to serialize failure ledger")]
    Serialize(#[source] serde_json::Error),

    /// I/O error on the ledger file
    #[error("Failure ledger I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Catalog error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Transfer error
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// Ledger error
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// HTTP client construction failed
    #[error("Failed to build HTTP client")]
    HttpClient(#[from] reqwest::Error),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error is worth another attempt
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::Transfer(e) if e.is_retryable())
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Catalog(_) => "catalog",
            AppError::Store(_) => "store",
            AppError::Transfer(_) => "transfer",
            AppError::Ledger(_) => "ledger",
            AppError::HttpClient(_) => "http",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

impl TransferError {
    /// Every transfer failure restarts the stream from byte zero
    pub fn is_retryable(&self) -> bool {
        match self {
            TransferError::SourceStatus { .. }
            | TransferError::SourceFetch { .. }
            | TransferError::Store(StoreError::Commit { .. }) => true,
            TransferError::Store(_) => false,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Catalog result type alias
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Store result type alias
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Transfer result type alias
pub type TransferResult<T> = std::result::Result<T, TransferError>;

/// Ledger result type alias
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
