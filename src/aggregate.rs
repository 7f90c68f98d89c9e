//! Runs every scraper and merges their records into one ordered list.
//!
//! Each scraper returns its own `Vec<CameraRecord>`; nothing is shared between
//! them. A scraper that fails contributes zero records and an error entry in
//! the [`RunReport`], and never stops the others.
//!
//! The output order is always [`Source::ALL`] order, then each scraper's own
//! order, whether the scrapers ran one after another or concurrently.

use crate::config::ScraperConfig;
use crate::error::Result;
use crate::http::{Trust, build_client};
use crate::models::{CameraRecord, Source};
use crate::scrapers::{cimahi, kab, kbb, kota, pelindung};
use futures::future::join_all;
use reqwest::Client;
use std::time::Instant;
use tracing::{error, info, instrument};

/// How one source fared during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceOutcome {
    pub source: Source,
    pub records: usize,
    /// Why the source produced nothing, if it failed.
    pub error: Option<String>,
}

/// Everything a run produced.
#[derive(Debug, Default)]
pub struct RunReport {
    pub records: Vec<CameraRecord>,
    pub outcomes: Vec<SourceOutcome>,
}

impl RunReport {
    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceOutcome> {
        self.outcomes.iter().filter(|o| o.error.is_some())
    }
}

/// Run one scraper.
#[instrument(level = "debug", skip(client, config))]
pub async fn scrape_source(
    source: Source,
    client: &Client,
    config: &ScraperConfig,
) -> Result<Vec<CameraRecord>> {
    match source {
        Source::Kota => kota::scrape(client, &config.kota).await,
        Source::Kbb => kbb::scrape(client, &config.kbb).await,
        Source::Kab => kab::scrape(client, &config.kab).await,
        Source::Pelindung => pelindung::scrape(&config.http, &config.pelindung).await,
        Source::Cimahi => cimahi::scrape(client, &config.cimahi).await,
    }
}

/// Run the selected scrapers and merge their output.
///
/// `sources` only selects which scrapers run; they always run, and their
/// records are always merged, in [`Source::ALL`] order. With `concurrent` the
/// scrapers' requests overlap, but the merged order is unchanged.
///
/// # Errors
///
/// Only fails if the shared HTTP client cannot be built. Scraper failures are
/// reported in [`RunReport::outcomes`].
#[instrument(level = "info", skip(config))]
pub async fn collect(config: &ScraperConfig, sources: &[Source], concurrent: bool) -> Result<RunReport> {
    let client = build_client(&config.http, Trust::Strict)?;
    let selected: Vec<Source> = Source::ALL
        .into_iter()
        .filter(|s| sources.contains(s))
        .collect();
    info!(sources = ?selected, concurrent, "Starting scrape run");

    let client = &client;
    let timed = move |source: Source| async move {
        let t0 = Instant::now();
        let result = scrape_source(source, client, config).await;
        (source, result, t0.elapsed())
    };

    let results = if concurrent {
        join_all(selected.iter().copied().map(timed)).await
    } else {
        let mut results = Vec::with_capacity(selected.len());
        for source in selected.iter().copied() {
            results.push(timed(source).await);
        }
        results
    };

    let mut report = RunReport::default();
    for (source, result, elapsed) in results {
        match result {
            Ok(records) => {
                info!(%source, count = records.len(), elapsed_ms = elapsed.as_millis() as u64, "Source finished");
                report.outcomes.push(SourceOutcome {
                    source,
                    records: records.len(),
                    error: None,
                });
                report.records.extend(records);
            }
            Err(e) => {
                error!(%source, error = %e, elapsed_ms = elapsed.as_millis() as u64, "Source failed; contributing no cameras");
                report.outcomes.push(SourceOutcome {
                    source,
                    records: 0,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    info!(
        total = report.records.len(),
        failed = report.failed_sources().count(),
        "Scrape run complete"
    );
    Ok(report)
}
