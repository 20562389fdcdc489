//! Configuration management for the video migrator
//!
//! Configuration comes from two sources. Secrets and endpoints are read from
//! the environment (a `.env` file is loaded first by `main`), and tuning lives
//! in an optional TOML file. Both are merged once at startup into an immutable
//! [`MigratorConfig`] that is passed to every component.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::{ClientConfig, FailureLedger, KeyMapper, StoreSettings, TransferConfig};
use crate::constants::{catalog, env, files, http, storage, transfer};
use crate::errors::{ConfigError, ConfigResult};

/// Secrets and endpoints taken from the environment
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub catalog_base_url: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub endpoint: Option<String>,
}

impl Credentials {
    /// Read credentials through `lookup`
    ///
    /// Blank values count as absent. Every missing required variable is
    /// reported in a single error.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut missing = Vec::new();
        let mut required = |name: &str| {
            read(name).unwrap_or_else(|| {
                missing.push(name.to_string());
                String::new()
            })
        };

        let api_key = required(env::CATALOG_API_KEY);
        let region = required(env::S3_REGION);
        let access_key_id = required(env::S3_ACCESS_KEY_ID);
        let secret_access_key = required(env::S3_SECRET_ACCESS_KEY);
        let bucket = required(env::S3_BUCKET);

        if !missing.is_empty() {
            return Err(ConfigError::MissingSettings { missing });
        }

        Ok(Self {
            api_key,
            catalog_base_url: read(env::CATALOG_BASE_URL)
                .unwrap_or_else(|| catalog::DEFAULT_BASE_URL.to_string()),
            region,
            access_key_id,
            secret_access_key,
            bucket,
            endpoint: read(env::S3_ENDPOINT),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("catalog_base_url", &self.catalog_base_url)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Tuning file layout
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Retry and upload settings
    pub transfer: TransferConfigToml,
    /// Destination key layout
    pub storage: StorageConfigToml,
    /// Failure ledger location
    pub ledger: LedgerConfigToml,
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfigToml {
    /// Catalog request timeout
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Connect timeout for catalog and source requests
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Catalog rate limit (requests per second)
    pub rate_limit_rps: u32,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            request_timeout: http::CATALOG_REQUEST_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            rate_limit_rps: catalog::DEFAULT_RATE_LIMIT_RPS,
        }
    }
}

/// TOML-friendly transfer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransferConfigToml {
    /// Retries after the first failed upload attempt
    pub max_retries: u32,
    /// Fixed wait between upload attempts
    #[serde(with = "humantime_serde")]
    pub retry_delay: Duration,
    /// Multipart part size in bytes
    pub part_size: usize,
}

impl Default for TransferConfigToml {
    fn default() -> Self {
        Self {
            max_retries: transfer::MAX_RETRIES,
            retry_delay: transfer::RETRY_DELAY,
            part_size: transfer::PART_SIZE,
        }
    }
}

/// TOML-friendly storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfigToml {
    /// Key prefix under which videos are written
    pub prefix: String,
}

impl Default for StorageConfigToml {
    fn default() -> Self {
        Self {
            prefix: storage::DEFAULT_PREFIX.to_string(),
        }
    }
}

/// TOML-friendly ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LedgerConfigToml {
    /// Ledger file path
    pub path: PathBuf,
}

impl Default for LedgerConfigToml {
    fn default() -> Self {
        Self {
            path: PathBuf::from(files::LEDGER_FILE_NAME),
        }
    }
}

impl AppConfig {
    /// Load the tuning file
    ///
    /// An explicitly named file must exist. Otherwise the first of
    /// `./video-migrator.toml` and `<config_dir>/video-migrator/config.toml`
    /// is used, falling back to defaults when neither exists.
    pub async fn load(config_file_override: Option<&Path>) -> ConfigResult<Self> {
        let config = match config_file_override {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Some(path) => Self::load_from_file(path).await?,
            None => match Self::find_config_file() {
                Some(path) => Self::load_from_file(&path).await?,
                None => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Check values the runtime cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.client.rate_limit_rps == 0 {
            return Err(ConfigError::InvalidValue {
                field: "client.rate_limit_rps".to_string(),
                value: "0".to_string(),
                reason: "Rate limit must be greater than zero".to_string(),
            });
        }

        if self.transfer.max_retries > transfer::MAX_RETRIES_LIMIT {
            return Err(ConfigError::InvalidValue {
                field: "transfer.max_retries".to_string(),
                value: self.transfer.max_retries.to_string(),
                reason: format!(
                    "Retry count must be at most {}",
                    transfer::MAX_RETRIES_LIMIT
                ),
            });
        }

        if self.transfer.part_size < transfer::MIN_PART_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "transfer.part_size".to_string(),
                value: self.transfer.part_size.to_string(),
                reason: format!(
                    "Part size must be at least {} bytes",
                    transfer::MIN_PART_SIZE
                ),
            });
        }

        if self.ledger.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ledger.path".to_string(),
                value: String::new(),
                reason: "Ledger path must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(files::LOCAL_CONFIG_FILE)];
        if let Some(path) = Self::default_config_path() {
            search_paths.push(path);
        }

        let found = search_paths.into_iter().find(|path| path.exists());
        if let Some(path) = &found {
            debug!("Found config file: {}", path.display());
        }
        found
    }

    /// Per-user config file location
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(files::CONFIG_DIR_NAME).join("config.toml"))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let config: AppConfig = toml::from_str(&content)?;
        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }
}

impl ClientConfigToml {
    /// Convert to runtime ClientConfig
    pub fn to_runtime_config(&self) -> ClientConfig {
        ClientConfig {
            request_timeout: self.request_timeout,
            connect_timeout: self.connect_timeout,
            rate_limit_rps: self.rate_limit_rps,
            ..ClientConfig::default()
        }
    }
}

impl TransferConfigToml {
    /// Convert to runtime TransferConfig
    pub fn to_runtime_config(&self) -> TransferConfig {
        TransferConfig {
            max_retries: self.max_retries,
            retry_delay: self.retry_delay,
            dry_run: false,
        }
    }
}

/// Everything a run needs, fixed at startup
#[derive(Debug, Clone)]
pub struct MigratorConfig {
    pub credentials: Credentials,
    pub client: ClientConfig,
    pub transfer: TransferConfig,
    pub store: StoreSettings,
    pub key_prefix: String,
    pub ledger_path: PathBuf,
}

impl MigratorConfig {
    /// Merge environment credentials with the tuning file
    pub fn new(credentials: Credentials, app: &AppConfig) -> Self {
        let mut store = StoreSettings::new(
            credentials.bucket.clone(),
            credentials.region.clone(),
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
        );
        store.endpoint = credentials.endpoint.clone();
        store.part_size = app.transfer.part_size;

        Self {
            client: app.client.to_runtime_config(),
            transfer: app.transfer.to_runtime_config(),
            store,
            key_prefix: app.storage.prefix.clone(),
            ledger_path: app.ledger.path.clone(),
            credentials,
        }
    }

    /// Key mapper shared by transfer and verification
    pub fn key_mapper(&self) -> KeyMapper {
        KeyMapper::new(self.key_prefix.clone())
    }

    /// Handle on the configured ledger file
    pub fn ledger(&self) -> FailureLedger {
        FailureLedger::new(self.ledger_path.clone())
    }
}
