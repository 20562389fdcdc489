//! Completeness verification
//!
//! Reconciles the whole catalog against a fresh listing of the store. Every
//! catalog record whose derived key is absent from the listing is reported as
//! missing, regardless of what the ledger says. The missing set replaces the
//! ledger so a following `--retry` run picks those videos up.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::app::catalog::{list_all, VideoCatalog};
use crate::app::keys::KeyMapper;
use crate::app::ledger::{FailureLedger, LedgerEntry};
use crate::app::models::VideoRecord;
use crate::app::store::{listing_prefix, ObjectStore};
use crate::errors::Result;

/// Error text recorded in the ledger for a missing video
pub const MISSING_FROM_STORE: &str = "Missing from store";

/// Result of one verification pass
#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    /// Records listed by the catalog
    pub catalog_total: usize,
    /// Keys listed by the store under the migration prefix
    pub store_total: usize,
    /// Catalog records whose key is present
    pub present: usize,
    /// Catalog records whose key is absent, in catalog order
    pub missing: Vec<VideoRecord>,
    /// Wall-clock duration of the pass
    pub duration: Duration,
}

impl VerificationReport {
    /// Whether every catalog record was found in the store
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Share of catalog records present in the store, as a percentage
    pub fn completeness(&self) -> f64 {
        if self.catalog_total == 0 {
            return 100.0;
        }
        (self.present as f64 / self.catalog_total as f64) * 100.0
    }
}

/// Catalog-versus-store reconciliation
pub struct Verifier<'a, C: ?Sized, S: ?Sized> {
    catalog: &'a C,
    store: &'a S,
    keys: KeyMapper,
}

impl<'a, C, S> Verifier<'a, C, S>
where
    C: VideoCatalog + ?Sized,
    S: ObjectStore + ?Sized,
{
    pub fn new(catalog: &'a C, store: &'a S, keys: KeyMapper) -> Self {
        Self {
            catalog,
            store,
            keys,
        }
    }

    /// Compare both sides without touching the ledger
    ///
    /// A failure to list either side aborts the pass.
    pub async fn reconcile(&self) -> Result<VerificationReport> {
        let started = Instant::now();

        let records = list_all(self.catalog).await?;
        let prefix = listing_prefix(self.keys.prefix());
        let stored: HashSet<String> = self.store.list_keys(&prefix).await?.into_iter().collect();
        debug!(
            "Verifying {} catalog records against {} stored keys",
            records.len(),
            stored.len()
        );

        let mut report = VerificationReport {
            catalog_total: records.len(),
            store_total: stored.len(),
            ..Default::default()
        };

        for record in records {
            let key = self.keys.key_for(&record);
            if stored.contains(key.as_str()) {
                report.present += 1;
            } else {
                debug!("{} is missing as {}", record.video_id, key);
                report.missing.push(record);
            }
        }

        report.duration = started.elapsed();
        Ok(report)
    }

    /// Reconcile and replace the ledger with the missing set
    ///
    /// Clears the ledger when nothing is missing.
    pub async fn run(&self, ledger: &FailureLedger) -> Result<VerificationReport> {
        let report = self.reconcile().await?;

        if report.is_complete() {
            info!(
                "All {} catalog videos are present in the store",
                report.catalog_total
            );
        } else {
            warn!(
                "{} of {} catalog videos are missing from the store",
                report.missing.len(),
                report.catalog_total
            );
        }

        let entries: Vec<LedgerEntry> = report
            .missing
            .iter()
            .map(|record| LedgerEntry::new(record, MISSING_FROM_STORE))
            .collect();
        ledger.save(&entries).await?;

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::app::models::StorageKey;
    use crate::app::store::ByteStream;
    use crate::errors::{CatalogError, CatalogResult, StoreResult, TransferResult};

    struct FixedCatalog(Vec<VideoRecord>);

    #[async_trait]
    impl VideoCatalog for FixedCatalog {
        async fn list_page(&self, page: u32) -> CatalogResult<Vec<VideoRecord>> {
            Ok(if page == 1 { self.0.clone() } else { Vec::new() })
        }

        async fn get_detail(&self, video_id: &str) -> CatalogResult<VideoRecord> {
            Err(CatalogError::Detail {
                video_id: video_id.to_string(),
                source: crate::errors::HttpError::Status { status: 404 },
            })
        }
    }

    struct ListedStore(Vec<String>);

    #[async_trait]
    impl ObjectStore for ListedStore {
        async fn exists(&self, key: &StorageKey) -> bool {
            self.0.iter().any(|k| k == key.as_str())
        }

        async fn put_stream(
            &self,
            _key: &StorageKey,
            _body: ByteStream,
            _size_hint: Option<u64>,
        ) -> TransferResult<u64> {
            Ok(0)
        }

        async fn list_keys(&self, prefix: &str) -> StoreResult<Vec<String>> {
            Ok(self
                .0
                .iter()
                .filter(|k| k.starts_with(prefix))
                .cloned()
                .collect())
        }
    }

    fn catalog() -> FixedCatalog {
        FixedCatalog(vec![
            VideoRecord::new("vi1", "First"),
            VideoRecord::new("vi2", "Second #2"),
            VideoRecord::new("vi3", ""),
        ])
    }

    #[tokio::test]
    async fn test_reports_exactly_the_missing_record() {
        let store = ListedStore(vec![
            "videos/First - vi1".to_string(),
            "videos/vi3".to_string(),
            "other/Second 2 - vi2".to_string(),
        ]);
        let catalog = catalog();
        let verifier = Verifier::new(&catalog, &store, KeyMapper::default());

        let report = verifier.reconcile().await.unwrap();

        assert_eq!(report.catalog_total, 3);
        assert_eq!(report.store_total, 2);
        assert_eq!(report.present, 2);
        assert_eq!(report.missing, vec![VideoRecord::new("vi2", "Second #2")]);
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn test_run_writes_and_clears_ledger() {
        let temp = TempDir::new().unwrap();
        let ledger = FailureLedger::new(temp.path().join("failed.json"));
        let catalog = catalog();

        let partial = ListedStore(vec!["videos/First - vi1".to_string()]);
        let report = Verifier::new(&catalog, &partial, KeyMapper::default())
            .run(&ledger)
            .await
            .unwrap();
        assert_eq!(report.missing.len(), 2);

        let entries = ledger.load().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].video_id, "vi2");
        assert_eq!(entries[0].error, MISSING_FROM_STORE);

        let full = ListedStore(vec![
            "videos/First - vi1".to_string(),
            "videos/Second 2 - vi2".to_string(),
            "videos/vi3".to_string(),
        ]);
        let report = Verifier::new(&catalog, &full, KeyMapper::default())
            .run(&ledger)
            .await
            .unwrap();
        assert!(report.is_complete());
        assert_eq!(report.completeness(), 100.0);
        assert!(!ledger.path().exists());
    }
}
