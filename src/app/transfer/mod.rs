//! Transfer pipeline
//!
//! Moves videos from the catalog into the store, strictly one at a time. Each
//! video walks the same states:
//!
//! ```text
//! Pending -> DetailFetched -> SkippedNoSource
//!                          -> KeyExists (skipped)
//!                          -> Uploading -> Success
//!                                       -> RetryWait -> Uploading
//!                                       -> ExhaustedRetries (failed)
//! ```
//!
//! A failed detail fetch fails the video at once. Only the upload step is
//! retried, with a fixed delay, and every retry streams the source again from
//! the first byte. No failure of a single video ever stops the batch.

use std::time::Instant;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::app::catalog::VideoCatalog;
use crate::app::keys::KeyMapper;
use crate::app::models::{SkipReason, StorageKey, TransferOutcome, VideoRecord};
use crate::app::source::MediaSource;
use crate::app::store::ObjectStore;
use crate::errors::TransferResult;

pub mod config;
pub mod progress;
pub mod stats;

pub use config::TransferConfig;
pub use progress::{NoProgress, ProgressEvent, ProgressReporter};
pub use stats::TransferReport;

/// Sequential catalog-to-store transfer
pub struct TransferPipeline<'a, C: ?Sized, S: ?Sized, M: ?Sized> {
    catalog: &'a C,
    store: &'a S,
    source: &'a M,
    keys: KeyMapper,
    config: TransferConfig,
}

impl<'a, C, S, M> TransferPipeline<'a, C, S, M>
where
    C: VideoCatalog + ?Sized,
    S: ObjectStore + ?Sized,
    M: MediaSource + ?Sized,
{
    pub fn new(
        catalog: &'a C,
        store: &'a S,
        source: &'a M,
        keys: KeyMapper,
        config: TransferConfig,
    ) -> Self {
        Self {
            catalog,
            store,
            source,
            keys,
            config,
        }
    }

    /// Process every record in order and summarize the run
    pub async fn run(
        &self,
        records: &[VideoRecord],
        reporter: &dyn ProgressReporter,
    ) -> TransferReport {
        let started = Instant::now();
        let mut report = TransferReport::new(records.len());

        info!(
            "Starting transfer of {} videos{}",
            records.len(),
            if self.config.dry_run { " (dry run)" } else { "" }
        );
        reporter.report(ProgressEvent::RunStarted {
            total: records.len(),
        });

        for (index, record) in records.iter().enumerate() {
            reporter.report(ProgressEvent::ItemStarted {
                index,
                video_id: record.video_id.clone(),
                label: record.label().to_string(),
            });

            let outcome = self.transfer_one(record, reporter).await;
            report.record(record, &outcome);

            reporter.report(ProgressEvent::ItemFinished {
                index,
                video_id: record.video_id.clone(),
                label: record.label().to_string(),
                outcome,
            });
        }

        report.duration = started.elapsed();
        info!(
            "Transfer finished in {:?}: {} uploaded, {} skipped, {} failed",
            report.duration,
            report.succeeded,
            report.skipped(),
            report.failed
        );
        report
    }

    /// Drive one video to a terminal outcome
    ///
    /// The key is derived from the record as listed (identifier and listing
    /// title), matching what the verifier derives later.
    pub async fn transfer_one(
        &self,
        record: &VideoRecord,
        reporter: &dyn ProgressReporter,
    ) -> TransferOutcome {
        let detail = match self.catalog.get_detail(&record.video_id).await {
            Ok(detail) => detail,
            Err(e) => {
                error!("{}", e);
                return TransferOutcome::Failed {
                    error: e.to_string(),
                    attempts: 0,
                    timestamp: Utc::now(),
                };
            }
        };

        let Some(source_url) = detail.source_url else {
            info!("Skipping {}: no source media", record.video_id);
            return TransferOutcome::Skipped(SkipReason::NoSourceUrl);
        };

        let key = self.keys.key_for(record);
        if self.store.exists(&key).await {
            debug!("Skipping {}: {} already stored", record.video_id, key);
            return TransferOutcome::Skipped(SkipReason::AlreadyExists);
        }

        if self.config.dry_run {
            info!("Dry run: would upload {} to {}", record.video_id, key);
            return TransferOutcome::Skipped(SkipReason::DryRun);
        }

        self.upload_with_retry(record, &source_url, key, reporter)
            .await
    }

    async fn upload_with_retry(
        &self,
        record: &VideoRecord,
        source_url: &str,
        key: StorageKey,
        reporter: &dyn ProgressReporter,
    ) -> TransferOutcome {
        let max_attempts = self.config.max_attempts();
        let mut attempts = 0;

        loop {
            attempts += 1;
            match self.upload_once(source_url, &key).await {
                Ok(bytes) => {
                    info!("Uploaded {} to {} ({} bytes)", record.video_id, key, bytes);
                    return TransferOutcome::Success { key, bytes };
                }
                Err(e) if e.is_retryable() && attempts < max_attempts => {
                    warn!(
                        "Upload of {} failed (attempt {}/{}): {}. Retrying in {:?}",
                        record.video_id, attempts, max_attempts, e, self.config.retry_delay
                    );
                    reporter.report(ProgressEvent::Retrying {
                        video_id: record.video_id.clone(),
                        attempt: attempts,
                        max_attempts,
                        error: e.to_string(),
                        delay: self.config.retry_delay,
                    });
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                Err(e) => {
                    error!(
                        "Upload of {} failed after {} attempts: {}",
                        record.video_id, attempts, e
                    );
                    return TransferOutcome::Failed {
                        error: e.to_string(),
                        attempts,
                        timestamp: Utc::now(),
                    };
                }
            }
        }
    }

    async fn upload_once(&self, source_url: &str, key: &StorageKey) -> TransferResult<u64> {
        let source = self.source.open(source_url).await?;
        self.store
            .put_stream(key, source.body, source.content_length)
            .await
    }
}
