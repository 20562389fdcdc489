//! Progress display for transfer runs
//!
//! Renders pipeline events either as an indicatif progress bar (when stderr is
//! a terminal) or as one plain line per video. Catalog listing, which can take
//! many pages, gets its own spinner.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::app::{ProgressEvent, ProgressReporter, TransferOutcome};
use crate::constants::progress;

/// Configuration for progress display
#[derive(Debug, Clone)]
pub struct ProgressConfig {
    /// Enable the visual progress bar when attached to a terminal
    pub enable_progress_bars: bool,
    /// Suppress per-video lines in text mode
    pub quiet: bool,
    /// Maximum width for titles in the display
    pub max_title_width: usize,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enable_progress_bars: true,
            quiet: false,
            max_title_width: progress::MAX_TITLE_WIDTH,
        }
    }
}

/// Terminal renderer for [`ProgressEvent`]s
pub struct ProgressDisplay {
    config: ProgressConfig,
    bar: Option<ProgressBar>,
    total: AtomicUsize,
}

impl ProgressDisplay {
    /// Create a display, choosing bar or text mode from the terminal
    pub fn new(config: ProgressConfig) -> Self {
        let is_terminal = atty::is(atty::Stream::Stderr);
        let bar = (config.enable_progress_bars && is_terminal && !config.quiet).then(|| {
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("##-"),
            );
            bar
        });

        Self {
            config,
            bar,
            total: AtomicUsize::new(0),
        }
    }

    /// Whether the display renders a progress bar
    pub fn is_bar_mode(&self) -> bool {
        self.bar.is_some()
    }

    /// Remove the bar from the terminal
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    fn line(&self, text: String) {
        match &self.bar {
            Some(bar) => bar.println(text),
            None if !self.config.quiet => eprintln!("{}", text),
            None => {}
        }
    }
}

impl ProgressReporter for ProgressDisplay {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::RunStarted { total } => {
                self.total.store(total, Ordering::Relaxed);
                if let Some(bar) = &self.bar {
                    bar.set_length(total as u64);
                    bar.enable_steady_tick(Duration::from_millis(progress::SPINNER_TICK_MS));
                }
            }
            ProgressEvent::ItemStarted { label, .. } => {
                if let Some(bar) = &self.bar {
                    bar.set_message(truncate_label(&label, self.config.max_title_width));
                }
            }
            ProgressEvent::Retrying {
                video_id,
                attempt,
                max_attempts,
                error,
                delay,
            } => {
                self.line(format!(
                    "  {} attempt {}/{} failed: {} (retrying in {:?})",
                    video_id, attempt, max_attempts, error, delay
                ));
            }
            ProgressEvent::ItemFinished {
                index,
                label,
                outcome,
                ..
            } => {
                let total = self.total.load(Ordering::Relaxed);
                let label = truncate_label(&label, self.config.max_title_width);
                match &self.bar {
                    Some(bar) => {
                        if outcome.is_failure() {
                            bar.println(format!("✗ {}: {}", label, describe_outcome(&outcome)));
                        }
                        bar.inc(1);
                    }
                    None => self.line(format!(
                        "[{}/{}] {}: {}",
                        index + 1,
                        total,
                        label,
                        describe_outcome(&outcome)
                    )),
                }
            }
        }
    }
}

/// Spinner shown while the catalog is listed
pub fn listing_spinner(message: &str, quiet: bool) -> ProgressBar {
    if quiet || !atty::is(atty::Stream::Stderr) {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["◐", "◓", "◑", "◒"]),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(progress::SPINNER_TICK_MS));
    spinner
}

/// One-line description of an outcome
pub fn describe_outcome(outcome: &TransferOutcome) -> String {
    match outcome {
        TransferOutcome::Success { key, bytes } => {
            format!("uploaded {} to {}", format_bytes(*bytes), key)
        }
        TransferOutcome::Skipped(reason) => format!("skipped ({})", reason),
        TransferOutcome::Failed {
            error, attempts: 0, ..
        } => format!("failed: {}", error),
        TransferOutcome::Failed {
            error, attempts, ..
        } => format!("failed after {} attempts: {}", attempts, error),
    }
}

/// Shorten `label` to at most `width` characters
pub fn truncate_label(label: &str, width: usize) -> String {
    if label.chars().count() <= width {
        return label.to_string();
    }
    let kept: String = label.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Format bytes in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
