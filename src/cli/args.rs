//! Command-line argument parsing for the video migrator
//!
//! The binary has no subcommands: a plain invocation transfers the whole
//! catalog, and mutually exclusive flags switch to retry, verify or ledger
//! inspection mode.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser};

/// Video Migrator - Copy a hosted video catalog into S3-compatible storage
#[derive(Parser, Debug)]
#[command(
    name = "video_migrator",
    version,
    about = "Migrate hosted videos into an S3-compatible object store",
    long_about = "Streams every video of a hosted catalog into an S3-compatible bucket.
Already stored videos are skipped, failures are recorded in a ledger for a later --retry run,
and --verify reconciles the full catalog against the bucket contents."
)]
#[command(group(
    ArgGroup::new("mode")
        .args(["retry", "verify", "show_ledger"])
        .multiple(false)
))]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Only process the videos recorded in the failure ledger
    #[arg(long)]
    pub retry: bool,

    /// Compare the catalog against the store instead of transferring
    #[arg(long)]
    pub verify: bool,

    /// Print the current failure ledger and exit
    #[arg(long)]
    pub show_ledger: bool,

    /// Transfer options
    #[command(flatten)]
    pub transfer: TransferArgs,
}

/// Global arguments
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Options for transfer and retry runs
#[derive(Args, Debug, Clone, Default)]
pub struct TransferArgs {
    /// Maximum number of videos to process
    #[arg(short, long, value_name = "N")]
    pub limit: Option<usize>,

    /// Show what would be uploaded without uploading or touching the ledger
    #[arg(long, conflicts_with_all = ["verify", "show_ledger"])]
    pub dry_run: bool,
}

/// What a single invocation does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Transfer the whole catalog
    Transfer,
    /// Transfer the ledger entries only
    Retry,
    /// Reconcile catalog and store
    Verify,
    /// Print the ledger
    ShowLedger,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Selected run mode
    pub fn mode(&self) -> RunMode {
        if self.retry {
            RunMode::Retry
        } else if self.verify {
            RunMode::Verify
        } else if self.show_ledger {
            RunMode::ShowLedger
        } else {
            RunMode::Transfer
        }
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

impl TransferArgs {
    /// Reject option values clap cannot check on its own
    pub fn validate(&self) -> Result<(), String> {
        if self.limit == Some(0) {
            return Err("--limit must be greater than 0".to_string());
        }
        Ok(())
    }
}
