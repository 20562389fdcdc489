//! Transfer run statistics
//!
//! Counts every terminal outcome of a run and collects the failures that will
//! be written to the ledger.

use std::time::Duration;

use serde::Serialize;

use crate::app::ledger::LedgerEntry;
use crate::app::models::{SkipReason, TransferOutcome, VideoRecord};

/// Summary of one transfer run
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransferReport {
    /// Videos handed to the pipeline
    pub total: usize,
    /// Uploads committed
    pub succeeded: usize,
    /// Skipped because the key already existed
    pub skipped_existing: usize,
    /// Skipped because the video has no source media
    pub skipped_no_source: usize,
    /// Skipped because of a dry run
    pub skipped_dry_run: usize,
    /// Videos that failed
    pub failed: usize,
    /// Bytes committed to the store
    pub bytes_transferred: u64,
    /// Failures in processing order
    pub failures: Vec<LedgerEntry>,
    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl TransferReport {
    /// Empty report for a run over `total` videos
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Account for the outcome of `record`
    pub fn record(&mut self, record: &VideoRecord, outcome: &TransferOutcome) {
        match outcome {
            TransferOutcome::Success { bytes, .. } => {
                self.succeeded += 1;
                self.bytes_transferred += bytes;
            }
            TransferOutcome::Skipped(SkipReason::AlreadyExists) => self.skipped_existing += 1,
            TransferOutcome::Skipped(SkipReason::NoSourceUrl) => self.skipped_no_source += 1,
            TransferOutcome::Skipped(SkipReason::DryRun) => self.skipped_dry_run += 1,
            TransferOutcome::Failed {
                error, timestamp, ..
            } => {
                self.failed += 1;
                self.failures
                    .push(LedgerEntry::at(record, error.clone(), *timestamp));
            }
        }
    }

    /// Videos not uploaded for a non-failure reason
    pub fn skipped(&self) -> usize {
        self.skipped_existing + self.skipped_no_source + self.skipped_dry_run
    }

    /// Videos with a terminal outcome so far
    pub fn processed(&self) -> usize {
        self.succeeded + self.skipped() + self.failed
    }

    /// Whether the run produced no failures
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    /// Share of processed videos that did not fail, as a percentage
    pub fn success_rate(&self) -> f64 {
        let processed = self.processed();
        if processed == 0 {
            return 100.0;
        }
        ((processed - self.failed) as f64 / processed as f64) * 100.0
    }
}
