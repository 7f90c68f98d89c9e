//! Pelindung Kota Bandung scraper.
//!
//! `GET api/cek` on port 8443 returns a bare JSON array:
//!
//! ```json
//! [{"id": "101", "cctv_name": "Simpang Lima", "lat": "-6.92", "lng": "107.62", "stream_cctv": "https://..."}]
//! ```
//!
//! Fields are mapped one-for-one. Missing coordinates default to `0` and a
//! missing stream to the empty string.
//!
//! # TLS
//!
//! The endpoint's certificate does not validate, so unless
//! `pelindung.accept_invalid_certs` is turned off this scraper uses its own
//! client with verification disabled. The relaxed client never leaves this module.

use crate::config::{HttpSettings, PelindungConfig};
use crate::error::Result;
use crate::http::{Trust, build_client, get_text};
use crate::models::{CameraRecord, Source};
use crate::utils::{json_number, json_text};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{info, instrument, warn};

const SOURCE: Source = Source::Pelindung;

/// Scrape every camera from the Pelindung API.
#[instrument(level = "info", skip_all, fields(source = %SOURCE))]
pub async fn scrape(http: &HttpSettings, config: &PelindungConfig) -> Result<Vec<CameraRecord>> {
    info!("Scraping Pelindung Kota Bandung");
    let trust = if config.accept_invalid_certs {
        Trust::AcceptInvalidCerts
    } else {
        Trust::Strict
    };
    let client = build_client(http, trust)?;

    let body = get_text(&client, &config.url).await?;
    let records = parse_response(&body)?;
    info!(count = records.len(), "Scraped Pelindung Kota Bandung");
    Ok(records)
}

/// Turn an `api/cek` response body into records.
///
/// Entries that are not objects, or whose coordinates are present but not
/// numeric, are skipped. An `id` seen twice keeps only its first entry.
pub fn parse_response(body: &str) -> Result<Vec<CameraRecord>> {
    let items: Vec<Value> = serde_json::from_str(body)?;
    let mut seen = HashSet::new();
    let records = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let Some(fields) = item.as_object() else {
                warn!(index, "Skipping non-object entry");
                return None;
            };
            match build_record(fields) {
                Ok(record) if !seen.insert(record.id.clone()) => {
                    warn!(index, camera = %record.id, "Duplicate camera id; keeping the first");
                    None
                }
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(index, error = %e, "Skipping camera");
                    None
                }
            }
        })
        .collect();
    Ok(records)
}

fn build_record(fields: &Map<String, Value>) -> Result<CameraRecord> {
    Ok(CameraRecord {
        id: SOURCE.record_id(&[json_text(fields.get("id")).as_str()]),
        name: SOURCE.record_name(&json_text(fields.get("cctv_name"))),
        lat: json_number(fields.get("lat"), "lat")?,
        lng: json_number(fields.get("lng"), "lng")?,
        stream_url: json_text(fields.get("stream_cctv")),
        region: SOURCE.region(),
    })
}
