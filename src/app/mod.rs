//! Core application logic for the video migrator
//!
//! This module contains the catalog client, the object store client, the
//! transfer pipeline, the failure ledger and the verifier.
//!
//! # Examples
//!
//! ```rust,no_run
//! use video_migrator::app::{
//!     list_all, CatalogClient, ClientConfig, HttpSource, KeyMapper, NoProgress, S3Store,
//!     StoreSettings, TransferConfig, TransferPipeline,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::default();
//! let catalog = CatalogClient::new("https://ws.api.video", "api-key", &config)?;
//! let store = S3Store::new(&StoreSettings::new("bucket", "eu-west-1", "key", "secret"))?;
//! let source = HttpSource::new(&config)?;
//!
//! let records = list_all(&catalog).await?;
//! let pipeline = TransferPipeline::new(
//!     &catalog,
//!     &store,
//!     &source,
//!     KeyMapper::default(),
//!     TransferConfig::default(),
//! );
//! let report = pipeline.run(&records, &NoProgress).await;
//! println!("{} uploaded, {} failed", report.succeeded, report.failed);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod keys;
pub mod ledger;
pub mod models;
pub mod source;
pub mod store;
pub mod transfer;
pub mod verify;

// Re-export main public API
pub use catalog::{list_all, CatalogClient, ClientConfig, VideoCatalog};
pub use keys::{derive_key, sanitize_title, KeyMapper};
pub use ledger::{FailureLedger, LedgerEntry};
pub use models::{SkipReason, StorageKey, TransferOutcome, VideoRecord};
pub use source::{HttpSource, MediaSource, SourceStream};
pub use store::{listing_prefix, ByteStream, ObjectStore, S3Store, StoreSettings};
pub use transfer::{
    NoProgress, ProgressEvent, ProgressReporter, TransferConfig, TransferPipeline,
    TransferReport,
};
pub use verify::{VerificationReport, Verifier};
