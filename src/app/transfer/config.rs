//! Transfer pipeline configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::transfer;

/// Retry behavior of the transfer pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Retries after the first failed upload attempt
    pub max_retries: u32,
    /// Fixed wait between upload attempts
    #[serde(with = "humantime_serde")]
    pub retry_delay: Duration,
    /// Resolve keys and existence but upload nothing
    #[serde(skip)]
    pub dry_run: bool,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            max_retries: transfer::MAX_RETRIES,
            retry_delay: transfer::RETRY_DELAY,
            dry_run: false,
        }
    }
}

impl TransferConfig {
    /// Upper bound of upload attempts per video
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}
