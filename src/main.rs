//! Video Migrator CLI application
//!
//! Streams a hosted video catalog into an S3-compatible bucket, with a failure
//! ledger for resumable retries and a verification mode.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use video_migrator::cli::{
    handle_retry, handle_show_ledger, handle_transfer, handle_verify, validate_startup, Cli,
    RunMode,
};
use video_migrator::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // A missing .env file is fine
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();
    init_logging(&cli);

    info!("Video Migrator v{} starting", env!("CARGO_PKG_VERSION"));

    let config_file = cli.global.config.as_deref();
    let quiet = cli.global.quiet;

    match cli.mode() {
        RunMode::ShowLedger => handle_show_ledger(config_file).await,
        mode => {
            let config = validate_startup(config_file).await?;
            match mode {
                RunMode::Retry => {
                    info!("Executing retry run");
                    handle_retry(&config, &cli.transfer, quiet).await
                }
                RunMode::Verify => {
                    info!("Executing verification");
                    handle_verify(&config, quiet).await
                }
                _ => {
                    info!("Executing transfer run");
                    handle_transfer(&config, &cli.transfer, quiet).await
                }
            }
        }
    }
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli) {
    let log_level = cli.log_level();

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("video_migrator={}", log_level).parse() {
        filter = filter.add_directive(directive);
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose)
        .with_writer(std::io::stderr)
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
