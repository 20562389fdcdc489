//! Command handlers for the video migrator CLI
//!
//! Each run mode gets one handler. Handlers own the user-facing output: the
//! listing spinner, the per-video progress and the end-of-run summary.

use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use crate::app::{
    list_all, CatalogClient, FailureLedger, HttpSource, LedgerEntry, S3Store, TransferPipeline,
    TransferReport, VerificationReport, Verifier, VideoRecord,
};
use crate::cli::progress::{format_bytes, listing_spinner};
use crate::cli::{ProgressConfig, ProgressDisplay, TransferArgs};
use crate::config::{AppConfig, MigratorConfig};
use crate::errors::{AppError, Result};

/// Missing videos listed in the verification summary before eliding
const MAX_LISTED_MISSING: usize = 10;

/// Handle a full catalog transfer
pub async fn handle_transfer(config: &MigratorConfig, args: &TransferArgs, quiet: bool) -> Result<()> {
    args.validate().map_err(AppError::generic)?;

    let catalog = catalog_client(config)?;
    let mut records = list_catalog(&catalog, quiet).await?;

    if let Some(limit) = args.limit {
        if records.len() > limit {
            info!("Limiting run to the first {} of {} videos", limit, records.len());
            records.truncate(limit);
        }
    }

    run_pipeline(config, &catalog, &records, Vec::new(), args.dry_run, quiet).await
}

/// Handle a retry of the videos recorded in the ledger
pub async fn handle_retry(config: &MigratorConfig, args: &TransferArgs, quiet: bool) -> Result<()> {
    args.validate().map_err(AppError::generic)?;

    let ledger = config.ledger();
    let entries = ledger.load().await;
    if entries.is_empty() {
        println!(
            "ℹ️  No failed transfers recorded in {} - nothing to retry",
            ledger.path().display()
        );
        return Ok(());
    }

    let (batch, carried_over) = split_retry_batch(entries, args.limit);
    info!(
        "Retrying {} ledger entries ({} left for a later run)",
        batch.len(),
        carried_over.len()
    );

    let records: Vec<VideoRecord> = batch.iter().map(LedgerEntry::to_record).collect();
    let catalog = catalog_client(config)?;
    run_pipeline(config, &catalog, &records, carried_over, args.dry_run, quiet).await
}

/// Handle a catalog-versus-store verification
pub async fn handle_verify(config: &MigratorConfig, quiet: bool) -> Result<()> {
    let catalog = catalog_client(config)?;
    let store = S3Store::new(&config.store)?;
    let ledger = config.ledger();

    let spinner = listing_spinner("Listing catalog and store...", quiet);
    let report = Verifier::new(&catalog, &store, config.key_mapper())
        .run(&ledger)
        .await;
    spinner.finish_and_clear();

    print_verification_summary(&report?, &ledger);
    Ok(())
}

/// Print the current ledger
pub async fn handle_show_ledger(config_file: Option<&Path>) -> Result<()> {
    let app = AppConfig::load(config_file).await?;
    let ledger = FailureLedger::new(app.ledger.path);
    let entries = ledger.load().await;

    if entries.is_empty() {
        println!("No failed transfers recorded in {}", ledger.path().display());
        return Ok(());
    }

    println!("📋 Failure ledger: {}", ledger.path().display());
    println!("  {} entries", entries.len());
    println!();
    for entry in &entries {
        println!(
            "  {} | {} | {}",
            entry.video_id,
            entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            entry.title
        );
        println!("      {}", entry.error);
    }
    Ok(())
}

fn catalog_client(config: &MigratorConfig) -> Result<CatalogClient> {
    Ok(CatalogClient::new(
        &config.credentials.catalog_base_url,
        &config.credentials.api_key,
        &config.client,
    )?)
}

async fn list_catalog(catalog: &CatalogClient, quiet: bool) -> Result<Vec<VideoRecord>> {
    let listing_start = Instant::now();
    let spinner = listing_spinner("Listing catalog...", quiet);
    let records = list_all(catalog).await;
    spinner.finish_and_clear();

    let records = records?;
    info!(
        "Catalog listing completed: {} videos in {:?}",
        records.len(),
        listing_start.elapsed()
    );
    Ok(records)
}

/// Transfer `records`, then replace the ledger with this run's failures
///
/// `carried_over` entries were not attempted and stay in the ledger. A dry
/// run never touches the ledger.
async fn run_pipeline(
    config: &MigratorConfig,
    catalog: &CatalogClient,
    records: &[VideoRecord],
    carried_over: Vec<LedgerEntry>,
    dry_run: bool,
    quiet: bool,
) -> Result<()> {
    let store = S3Store::new(&config.store)?;
    let source = HttpSource::new(&config.client)?;
    let ledger = config.ledger();

    let mut transfer = config.transfer.clone();
    transfer.dry_run = dry_run;

    let display = ProgressDisplay::new(ProgressConfig {
        quiet,
        ..Default::default()
    });
    let pipeline = TransferPipeline::new(catalog, &store, &source, config.key_mapper(), transfer);
    let report = pipeline.run(records, &display).await;
    display.finish();

    if dry_run {
        info!("Dry run: ledger left untouched");
    } else {
        let mut entries = report.failures.clone();
        entries.extend(carried_over);
        ledger.save(&entries).await?;
    }

    print_transfer_summary(&report, &ledger, dry_run);
    Ok(())
}

/// First `limit` entries to retry now, and the rest
fn split_retry_batch(
    mut entries: Vec<LedgerEntry>,
    limit: Option<usize>,
) -> (Vec<LedgerEntry>, Vec<LedgerEntry>) {
    match limit {
        Some(limit) if limit < entries.len() => {
            let rest = entries.split_off(limit);
            (entries, rest)
        }
        _ => (entries, Vec::new()),
    }
}

fn print_transfer_summary(report: &TransferReport, ledger: &FailureLedger, dry_run: bool) {
    println!("\n📊 Transfer Summary:");
    println!("  Total videos: {}", report.total);
    println!(
        "  Uploaded: {} ({})",
        report.succeeded,
        format_bytes(report.bytes_transferred)
    );
    println!("  Skipped (already stored): {}", report.skipped_existing);
    println!("  Skipped (no source media): {}", report.skipped_no_source);
    if dry_run {
        println!("  Would upload: {}", report.skipped_dry_run);
    }
    println!("  Failed: {}", report.failed);
    println!("  Duration: {:?}", report.duration);
    println!("  Success rate: {:.1}%", report.success_rate());

    if dry_run {
        println!("\nℹ️  Dry run - nothing was uploaded and the ledger was not changed");
    } else if report.is_clean() {
        println!("\n✅ No failures - ledger cleared");
    } else {
        warn!("Transfer completed with {} failures", report.failed);
        println!(
            "\n⚠️  {} failures recorded in {}",
            report.failed,
            ledger.path().display()
        );
        println!("   Run 'video_migrator --retry' to retry them.");
    }
}

fn print_verification_summary(report: &VerificationReport, ledger: &FailureLedger) {
    println!("\n🔍 Verification Summary:");
    println!("  Catalog videos: {}", report.catalog_total);
    println!("  Stored objects: {}", report.store_total);
    println!("  Present: {}", report.present);
    println!("  Missing: {}", report.missing.len());
    println!("  Completeness: {:.1}%", report.completeness());
    println!("  Duration: {:?}", report.duration);

    if report.is_complete() {
        println!("\n✅ Every catalog video is present in the store - ledger cleared");
        return;
    }

    println!("\nMissing videos:");
    for record in report.missing.iter().take(MAX_LISTED_MISSING) {
        println!("  • {} ({})", record.label(), record.video_id);
    }
    if report.missing.len() > MAX_LISTED_MISSING {
        println!(
            "  ... and {} more",
            report.missing.len() - MAX_LISTED_MISSING
        );
    }
    println!(
        "\n⚠️  Missing videos recorded in {}",
        ledger.path().display()
    );
    println!("   Run 'video_migrator --retry' to transfer them.");
}
