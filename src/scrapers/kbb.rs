//! ATCS Kabupaten Bandung Barat scraper.
//!
//! A single `GET get-cctv` returns:
//!
//! ```json
//! {"status": "success", "data": [{"nama_cctv": "...", "koordinat": "-6.84, 107.48", "link": "https://.../id/cam.html"}]}
//! ```
//!
//! Items carry no identifier, so a record id is the item's index in `data`.
//! The `link` points at an HTML player page; the playlist lives under `memfs/`
//! with an `.m3u8` extension.

use crate::config::KbbConfig;
use crate::error::{Result, ScrapeError};
use crate::http::get_text;
use crate::models::{CameraRecord, Source};
use crate::utils::{json_text, parse_coordinate_pair};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

const SOURCE: Source = Source::Kbb;
const SUCCESS: &str = "success";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    status: Option<Value>,
    #[serde(default)]
    data: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    nama_cctv: Option<Value>,
    #[serde(default)]
    koordinat: Option<Value>,
    #[serde(default)]
    link: Option<Value>,
}

/// Scrape every camera from ATCS Bandung Barat.
///
/// An envelope whose `status` is not `"success"` rejects the whole response.
/// An item with a malformed `koordinat` is skipped; its index is still consumed.
#[instrument(level = "info", skip_all, fields(source = %SOURCE))]
pub async fn scrape(client: &Client, config: &KbbConfig) -> Result<Vec<CameraRecord>> {
    info!("Scraping ATCS Bandung Barat");
    let body = get_text(client, &config.url).await?;
    let records = parse_response(&body)?;
    info!(count = records.len(), "Scraped ATCS Bandung Barat");
    Ok(records)
}

/// Turn a `get-cctv` response body into records.
pub fn parse_response(body: &str) -> Result<Vec<CameraRecord>> {
    let envelope: Envelope = serde_json::from_str(body)?;
    let status = json_text(envelope.status.as_ref());
    if status != SUCCESS {
        return Err(ScrapeError::Rejected(status));
    }

    let records = envelope
        .data
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match build_record(index, item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(index, error = %e, "Skipping camera");
                None
            }
        })
        .collect();
    Ok(records)
}

fn build_record(index: usize, item: &Item) -> Result<CameraRecord> {
    let koordinat = match item.koordinat.as_ref().filter(|v| !v.is_null()) {
        Some(value) => json_text(Some(value)),
        None => "0,0".to_string(),
    };
    let (lat, lng) = parse_coordinate_pair(&koordinat)?;
    Ok(CameraRecord {
        id: SOURCE.record_id(&[index.to_string().as_str()]),
        name: SOURCE.record_name(&json_text(item.nama_cctv.as_ref())),
        lat,
        lng,
        stream_url: playlist_url(&json_text(item.link.as_ref())),
        region: SOURCE.region(),
    })
}

/// Rewrite a player page link into its HLS playlist.
///
/// `https://atcs.bandungbaratkab.go.id/video/cam1.html` becomes
/// `https://atcs.bandungbaratkab.go.id/memfs/video/cam1.m3u8`.
pub fn playlist_url(link: &str) -> String {
    link.replace(".html", ".m3u8").replace("id/", "id/memfs/")
}
