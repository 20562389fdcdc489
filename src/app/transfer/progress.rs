//! Progress events emitted by the transfer pipeline

use std::time::Duration;

use crate::app::models::TransferOutcome;

/// Something observable happened during a run
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// A run over `total` videos begins
    RunStarted { total: usize },
    /// Work on one video begins
    ItemStarted {
        index: usize,
        video_id: String,
        label: String,
    },
    /// An upload attempt failed and will be repeated after `delay`
    Retrying {
        video_id: String,
        attempt: u32,
        max_attempts: u32,
        error: String,
        delay: Duration,
    },
    /// One video reached a terminal outcome
    ItemFinished {
        index: usize,
        video_id: String,
        label: String,
        outcome: TransferOutcome,
    },
}

/// Receiver of pipeline progress
pub trait ProgressReporter {
    fn report(&self, event: ProgressEvent);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}
