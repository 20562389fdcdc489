//! Integration tests for the transfer pipeline
//!
//! Drive the pipeline end to end against in-memory doubles and check the
//! outcome of every video, the number of uploads and the retry timing.

mod common;

use std::time::Duration;

use tokio::time::Instant;

use common::{source_url, video, MemoryCatalog, MemorySource, MemoryStore, RecordingReporter};
use video_migrator::app::{
    derive_key, KeyMapper, NoProgress, TransferConfig, TransferPipeline, VideoRecord,
};

fn pipeline<'a>(
    catalog: &'a MemoryCatalog,
    store: &'a MemoryStore,
    source: &'a MemorySource,
) -> TransferPipeline<'a, MemoryCatalog, MemoryStore, MemorySource> {
    TransferPipeline::new(
        catalog,
        store,
        source,
        KeyMapper::default(),
        TransferConfig::default(),
    )
}

fn source_for(records: &[VideoRecord]) -> MemorySource {
    records.iter().fold(MemorySource::new(), |source, record| {
        let payload = format!("payload of {}", record.video_id);
        source.with_payload(&source_url(&record.video_id), payload.as_bytes())
    })
}

#[tokio::test]
async fn test_transfer_uploads_every_video_under_derived_key() {
    let records = vec![video("vi1", "Launch day"), video("vi2", "Épisode #1!")];
    let catalog = MemoryCatalog::new(records.clone());
    let store = MemoryStore::new();
    let source = source_for(&records);

    let report = pipeline(&catalog, &store, &source)
        .run(&catalog.listed(), &NoProgress)
        .await;

    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(
        store.keys(),
        vec!["videos/Episode 1 - vi2", "videos/Launch day - vi1"]
    );
    assert_eq!(
        store.get("videos/Launch day - vi1").unwrap(),
        b"payload of vi1".to_vec()
    );
    assert_eq!(report.bytes_transferred, 28);
}

#[tokio::test]
async fn test_second_run_uploads_nothing() {
    let records = vec![video("vi1", "One"), video("vi2", "Two"), video("vi3", "")];
    let catalog = MemoryCatalog::new(records.clone());
    let store = MemoryStore::new();
    let source = source_for(&records);
    let listed = catalog.listed();

    let first = pipeline(&catalog, &store, &source).run(&listed, &NoProgress).await;
    assert_eq!(first.succeeded, 3);
    assert_eq!(store.put_count(), 3);

    let second = pipeline(&catalog, &store, &source).run(&listed, &NoProgress).await;
    assert_eq!(second.succeeded, 0);
    assert_eq!(second.skipped_existing, 3);
    assert_eq!(store.put_count(), 3);
    assert_eq!(source.open_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_failing_upload_is_attempted_four_times() {
    let records = vec![video("vi1", "Broken")];
    let catalog = MemoryCatalog::new(records.clone());
    let store = MemoryStore::new();
    let source = MemorySource::new().always_fail(&source_url("vi1"));
    let reporter = RecordingReporter::default();

    let started = Instant::now();
    let report = pipeline(&catalog, &store, &source)
        .run(&catalog.listed(), &reporter)
        .await;
    let elapsed = started.elapsed();

    assert_eq!(source.open_count(), 4);
    assert_eq!(reporter.retries(), 3);
    assert!(elapsed >= Duration::from_secs(15));
    assert!(elapsed < Duration::from_secs(16));

    assert_eq!(report.failed, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].video_id, "vi1");
    assert_eq!(report.failures[0].title, "Broken");
    assert!(report.failures[0].error.contains("503"));
    assert!(store.keys().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_transient_failure_recovers() {
    let records = vec![video("vi1", "Flaky")];
    let catalog = MemoryCatalog::new(records.clone());
    let store = MemoryStore::new();
    let source = source_for(&records).fail_first(2);

    let started = Instant::now();
    let report = pipeline(&catalog, &store, &source)
        .run(&catalog.listed(), &NoProgress)
        .await;

    assert_eq!(report.succeeded, 1);
    assert!(report.is_clean());
    assert_eq!(source.open_count(), 3);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(10));
    assert!(elapsed < Duration::from_secs(11));
}

#[tokio::test(start_paused = true)]
async fn test_store_commit_failure_is_retried() {
    let records = vec![video("vi1", "Rejected")];
    let catalog = MemoryCatalog::new(records.clone());
    let store = MemoryStore::new();
    store.fail_puts.store(true, std::sync::atomic::Ordering::SeqCst);
    let source = source_for(&records);

    let report = pipeline(&catalog, &store, &source)
        .run(&catalog.listed(), &NoProgress)
        .await;

    assert_eq!(report.failed, 1);
    assert_eq!(store.put_count(), 4);
    assert!(report.failures[0].error.contains("simulated commit failure"));
}

#[tokio::test]
async fn test_custom_retry_budget() {
    let records = vec![video("vi1", "Broken")];
    let catalog = MemoryCatalog::new(records.clone());
    let store = MemoryStore::new();
    let source = MemorySource::new().always_fail(&source_url("vi1"));

    let config = TransferConfig {
        max_retries: 1,
        retry_delay: Duration::ZERO,
        ..Default::default()
    };
    let report = TransferPipeline::new(&catalog, &store, &source, KeyMapper::default(), config)
        .run(&catalog.listed(), &NoProgress)
        .await;

    assert_eq!(report.failed, 1);
    assert_eq!(source.open_count(), 2);
}

#[tokio::test]
async fn test_video_without_source_is_skipped_not_failed() {
    let catalog = MemoryCatalog::new(vec![
        VideoRecord::new("vi1", "Processing"),
        video("vi2", "Ready"),
    ]);
    let store = MemoryStore::new();
    let source = MemorySource::new();

    let report = pipeline(&catalog, &store, &source)
        .run(&catalog.listed(), &NoProgress)
        .await;

    assert_eq!(report.skipped_no_source, 1);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 0);
    assert!(report.failures.is_empty());
    assert_eq!(source.open_count(), 1);
}

#[tokio::test]
async fn test_detail_failure_fails_without_retry_and_batch_continues() {
    let records = vec![video("vi1", "Gone"), video("vi2", "Fine")];
    let catalog = MemoryCatalog::new(records.clone()).fail_detail("vi1");
    let store = MemoryStore::new();
    let source = source_for(&records);
    let reporter = RecordingReporter::default();

    let report = pipeline(&catalog, &store, &source)
        .run(&catalog.listed(), &reporter)
        .await;

    assert_eq!(report.failed, 1);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failures[0].video_id, "vi1");
    assert_eq!(reporter.retries(), 0);
    assert_eq!(reporter.finished(), 2);
    assert_eq!(catalog.detail_requests.load(std::sync::atomic::Ordering::SeqCst), 2);
    assert_eq!(source.open_count(), 1);
}

#[tokio::test]
async fn test_dry_run_checks_existence_but_uploads_nothing() {
    let records = vec![video("vi1", "Stored"), video("vi2", "New")];
    let catalog = MemoryCatalog::new(records.clone());
    let store = MemoryStore::with_keys(&["videos/Stored - vi1"]);
    let source = source_for(&records);

    let config = TransferConfig {
        dry_run: true,
        ..Default::default()
    };
    let report = TransferPipeline::new(&catalog, &store, &source, KeyMapper::default(), config)
        .run(&catalog.listed(), &NoProgress)
        .await;

    assert_eq!(report.skipped_existing, 1);
    assert_eq!(report.skipped_dry_run, 1);
    assert_eq!(store.put_count(), 0);
    assert_eq!(source.open_count(), 0);
}

#[tokio::test]
async fn test_key_comes_from_listing_title() {
    // The detail endpoint may report a different title than the listing
    let catalog = MemoryCatalog::new(vec![video("vi1", "Renamed later")]);
    let store = MemoryStore::new();
    let source = source_for(&[video("vi1", "")]);
    let listed = vec![VideoRecord::new("vi1", "Original")];

    let report = pipeline(&catalog, &store, &source).run(&listed, &NoProgress).await;

    assert_eq!(report.succeeded, 1);
    assert_eq!(
        store.keys(),
        vec![derive_key("videos", "vi1", "Original").into_string()]
    );
}
