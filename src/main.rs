//! # Bandung CCTV
//!
//! Collects live traffic camera metadata from five Bandung-area municipal
//! endpoints and writes it as one JSON document for a map-based viewer.
//!
//! ## Sources
//!
//! - ATCS Kota Bandung, ATCS Bandung Barat, Dishub Kabupaten Bandung,
//!   Pelindung Kota Bandung and Smart City Kota Cimahi
//!
//! ## Usage
//!
//! ```sh
//! bandung_cctv                      # writes src/data/cctvs.json
//! bandung_cctv -d ./public/data     # custom data directory
//! ```
//!
//! ## Architecture
//!
//! A single best-effort pass:
//! 1. **Scraping**: Each source is scraped independently; a failing source contributes nothing
//! 2. **Merging**: Records are concatenated in fixed source order
//! 3. **Output**: The merged list replaces `<data-dir>/cctvs.json`
//!
//! The process exits successfully even when some or all sources failed; only
//! configuration and output errors are fatal.

use clap::Parser;
use itertools::Itertools;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregate;
mod cli;
mod config;
mod error;
mod http;
mod models;
mod outputs;
mod scrapers;
mod utils;

use cli::Cli;
use outputs::json;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("bandung_cctv starting up");

    let args = Cli::parse();
    debug!(?args.data_dir, ?args.config, ?args.only, "Parsed CLI arguments");

    // Early check: fail before any network traffic if the output can't be written
    if let Err(e) = ensure_writable_dir(&args.data_dir).await {
        error!(
            path = %args.data_dir.display(),
            error = %e,
            "Data directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    let config = config::load_config(args.config.as_deref()).await?;

    // ---- Scrape ----
    let report = aggregate::collect(&config, &args.sources(), args.concurrent).await?;

    for outcome in &report.outcomes {
        match &outcome.error {
            None => info!(source = %outcome.source, count = outcome.records, "Source summary"),
            Some(reason) => warn!(source = %outcome.source, %reason, "Source summary: failed"),
        }
    }

    let locations = report
        .records
        .iter()
        .map(|record| record.location_slug())
        .unique()
        .count();
    info!(cameras = report.records.len(), locations, "Collected cameras");

    // ---- Output ----
    let path = json::write_cameras(&report.records, &args.data_dir).await?;
    match json::read_cameras(&path).await {
        Ok(written) if written.len() == report.records.len() => {
            info!(path = %path.display(), count = written.len(), "Verified written snapshot");
        }
        Ok(written) => {
            warn!(path = %path.display(), expected = report.records.len(), found = written.len(), "Snapshot length mismatch");
        }
        Err(e) => warn!(path = %path.display(), error = %e, "Could not read back snapshot"),
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        failed_sources = report.failed_sources().count(),
        "Execution complete"
    );

    Ok(())
}
