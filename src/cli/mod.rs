//! Command-line interface components
//!
//! This module contains CLI-specific code for the video migrator, including
//! argument parsing, startup validation, progress display and the run mode
//! handlers.

pub mod args;
pub mod commands;
pub mod progress;
pub mod startup;

pub use args::{Cli, GlobalArgs, RunMode, TransferArgs};
pub use commands::{handle_retry, handle_show_ledger, handle_transfer, handle_verify};
pub use progress::{ProgressConfig, ProgressDisplay};
pub use startup::{resolve_config, show_missing_settings, validate_startup};
