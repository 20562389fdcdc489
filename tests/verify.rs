//! Integration tests for verification and the ledger-driven retry flow

mod common;

use std::time::Duration;

use tempfile::TempDir;

use common::{source_url, video, MemoryCatalog, MemorySource, MemoryStore};
use video_migrator::app::verify::MISSING_FROM_STORE;
use video_migrator::app::{
    list_all, FailureLedger, KeyMapper, LedgerEntry, NoProgress, TransferConfig,
    TransferPipeline, Verifier, VideoRecord,
};

fn quick_retries() -> TransferConfig {
    TransferConfig {
        retry_delay: Duration::ZERO,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_verify_reports_the_single_missing_video() {
    let records: Vec<VideoRecord> = (1..=5)
        .map(|i| video(&format!("vi{i}"), &format!("Talk #{i}")))
        .collect();
    let catalog = MemoryCatalog::new(records);
    let store = MemoryStore::with_keys(&[
        "videos/Talk 1 - vi1",
        "videos/Talk 2 - vi2",
        "videos/Talk 4 - vi4",
        "videos/Talk 5 - vi5",
    ]);
    let temp = TempDir::new().unwrap();
    let ledger = FailureLedger::new(temp.path().join("failed-transfers.json"));

    let report = Verifier::new(&catalog, &store, KeyMapper::default())
        .run(&ledger)
        .await
        .unwrap();

    assert_eq!(report.catalog_total, 5);
    assert_eq!(report.present, 4);
    assert_eq!(report.missing, vec![VideoRecord::new("vi3", "Talk #3")]);

    let entries = ledger.load().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].video_id, "vi3");
    assert_eq!(entries[0].title, "Talk #3");
    assert_eq!(entries[0].error, MISSING_FROM_STORE);
}

#[tokio::test]
async fn test_verify_after_transfer_finds_nothing_missing() {
    let records = vec![
        video("vi1", "Café  Talk #3"),
        video("vi2", "???"),
        video("vi3", "  Keynote\t2024 . final "),
    ];
    let catalog = MemoryCatalog::new(records.clone());
    let store = MemoryStore::new();
    let source = records.iter().fold(MemorySource::new(), |s, r| {
        s.with_payload(&source_url(&r.video_id), b"bytes")
    });
    let temp = TempDir::new().unwrap();
    let ledger = FailureLedger::new(temp.path().join("failed-transfers.json"));
    ledger
        .save(&[LedgerEntry::new(&records[0], "stale")])
        .await
        .unwrap();

    let listed = list_all(&catalog).await.unwrap();
    let transfer = TransferPipeline::new(
        &catalog,
        &store,
        &source,
        KeyMapper::default(),
        TransferConfig::default(),
    )
    .run(&listed, &NoProgress)
    .await;
    assert_eq!(transfer.succeeded, 3);

    let report = Verifier::new(&catalog, &store, KeyMapper::default())
        .run(&ledger)
        .await
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.store_total, 3);
    assert!(!ledger.path().exists());
}

#[tokio::test]
async fn test_verify_ignores_keys_outside_the_prefix() {
    let catalog = MemoryCatalog::new(vec![video("vi1", "One")]);
    let store = MemoryStore::with_keys(&["archive/One - vi1", "videos-old/One - vi1"]);

    let report = Verifier::new(&catalog, &store, KeyMapper::default())
        .reconcile()
        .await
        .unwrap();

    assert_eq!(report.store_total, 0);
    assert_eq!(report.missing.len(), 1);
}

#[tokio::test]
async fn test_failed_videos_are_retried_from_the_ledger() {
    let records = vec![video("vi1", "Good"), video("vi2", "Flaky"), video("vi3", "")];
    let catalog = MemoryCatalog::new(records.clone());
    let store = MemoryStore::new();
    let temp = TempDir::new().unwrap();
    let ledger = FailureLedger::new(temp.path().join("failed-transfers.json"));

    // First run: vi2 fails every attempt
    let failing = MemorySource::new()
        .with_payload(&source_url("vi1"), b"one")
        .with_payload(&source_url("vi3"), b"three")
        .always_fail(&source_url("vi2"));
    let report = TransferPipeline::new(
        &catalog,
        &store,
        &failing,
        KeyMapper::default(),
        quick_retries(),
    )
    .run(&catalog.listed(), &NoProgress)
    .await;
    assert_eq!(report.failed, 1);
    ledger.save(&report.failures).await.unwrap();

    let entries = ledger.load().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].video_id, "vi2");

    // Retry run: only the ledger entries are processed
    let healthy = MemorySource::new().with_payload(&source_url("vi2"), b"two");
    let retry_records: Vec<VideoRecord> = entries.iter().map(LedgerEntry::to_record).collect();
    let report = TransferPipeline::new(
        &catalog,
        &store,
        &healthy,
        KeyMapper::default(),
        quick_retries(),
    )
    .run(&retry_records, &NoProgress)
    .await;

    assert_eq!(report.total, 1);
    assert_eq!(report.succeeded, 1);
    assert_eq!(healthy.open_count(), 1);
    ledger.save(&report.failures).await.unwrap();
    assert!(!ledger.path().exists());
    assert_eq!(store.get("videos/Flaky - vi2").unwrap(), b"two".to_vec());
}

#[tokio::test]
async fn test_listing_pages_until_short_page() {
    let records: Vec<VideoRecord> = (0..237)
        .map(|i| video(&format!("vi{i:03}"), "Clip"))
        .collect();
    let catalog = MemoryCatalog::new(records);

    let listed = list_all(&catalog).await.unwrap();

    assert_eq!(listed.len(), 237);
    assert_eq!(
        catalog
            .page_requests
            .load(std::sync::atomic::Ordering::SeqCst),
        3
    );
    assert!(listed.iter().all(|r| r.source_url.is_none()));
}
