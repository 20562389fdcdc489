//! Startup validation for the video migrator
//!
//! Builds the immutable [`MigratorConfig`] from the environment and the
//! optional tuning file. Missing settings are all reported at once before the
//! process exits.

use std::path::Path;

use tracing::{debug, error};

use crate::config::{AppConfig, Credentials, MigratorConfig};
use crate::errors::{ConfigError, Result};

/// Load and validate the full configuration from the process environment
pub async fn validate_startup(config_file: Option<&Path>) -> Result<MigratorConfig> {
    resolve_config(config_file, |name| std::env::var(name).ok()).await
}

/// Load and validate the full configuration, reading variables through `lookup`
pub async fn resolve_config<F>(config_file: Option<&Path>, lookup: F) -> Result<MigratorConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let credentials = match Credentials::from_lookup(lookup) {
        Ok(credentials) => credentials,
        Err(ConfigError::MissingSettings { missing }) => {
            error!("Missing required settings: {}", missing.join(", "));
            show_missing_settings(&missing);
            return Err(ConfigError::MissingSettings { missing }.into());
        }
        Err(e) => return Err(e.into()),
    };

    let app = AppConfig::load(config_file).await?;
    let config = MigratorConfig::new(credentials, &app);
    debug!("Startup configuration: {:?}", config);
    Ok(config)
}

/// Tell the user which environment variables to set
pub fn show_missing_settings(missing: &[String]) {
    eprintln!("❌ Missing required configuration:");
    for name in missing {
        eprintln!("   • {}", name);
    }
    eprintln!("   Set them in the environment or in a .env file.");
}
