//! Video Migrator Library
//!
//! Migrates a hosted video catalog into an S3-compatible object store.
//! Transfers stream straight from the source to the bucket, already stored
//! videos are skipped, failures are kept in a ledger for later retries, and a
//! verification pass reconciles the catalog against the bucket contents.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
