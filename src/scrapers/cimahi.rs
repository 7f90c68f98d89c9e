//! Kota Cimahi smart city CCTV scraper.
//!
//! The [Cimahi CCTV page](https://smartcity.cimahikota.go.id/cctv) exposes no
//! coordinates and no structured list. Two things are read from the HTML
//! independently:
//!
//! - camera ids, from `run("<id>")` click handlers
//! - street names, from text-only `<p>` elements starting with `Jl`
//!
//! The two sequences are paired by position (see [`pair_positionally`]).
//! Coordinates come from a configured landmark table matched against the name,
//! and the stream URL is built from the camera id.

use crate::config::{CimahiConfig, Landmark, LatLng};
use crate::error::Result;
use crate::http::get_text;
use crate::models::{CameraRecord, Source};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

const SOURCE: Source = Source::Cimahi;

static RUN_CALL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"run\("(\d+)"\)"#).unwrap());

/// Scrape every camera from the Cimahi smart city page.
#[instrument(level = "info", skip_all, fields(source = %SOURCE))]
pub async fn scrape(client: &Client, config: &CimahiConfig) -> Result<Vec<CameraRecord>> {
    info!("Scraping Kota Cimahi");
    let html = get_text(client, &config.page_url).await?;
    let records = extract_cameras(&html, config);
    info!(count = records.len(), "Scraped Kota Cimahi");
    Ok(records)
}

/// Build records from the page HTML.
///
/// A camera id seen twice keeps only its first record.
pub fn extract_cameras(html: &str, config: &CimahiConfig) -> Vec<CameraRecord> {
    let ids = extract_camera_ids(html);
    let names = extract_location_names(html);
    if names.len() != ids.len() {
        warn!(
            ids = ids.len(),
            names = names.len(),
            "Camera id and name counts differ; pairing by position anyway"
        );
    }

    let mut seen = HashSet::new();
    pair_positionally(&ids, &names)
        .into_iter()
        .filter_map(|(id, name)| {
            if !seen.insert(id.clone()) {
                warn!(camera = %id, "Duplicate camera id; keeping the first");
                return None;
            }
            let position = resolve_position(&name, &config.landmarks, config.fallback);
            debug!(camera = %id, %name, lat = position.lat, lng = position.lng, "Resolved camera");
            Some(CameraRecord {
                id: SOURCE.record_id(&[id.as_str()]),
                name: SOURCE.record_name(&name),
                lat: position.lat,
                lng: position.lng,
                stream_url: stream_url(&config.stream_url_template, &id),
                region: SOURCE.region(),
            })
        })
        .collect()
}

/// Camera ids from `run("<id>")` handlers, in page order.
pub fn extract_camera_ids(html: &str) -> Vec<String> {
    RUN_CALL_RE
        .captures_iter(html)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Street names from text-only `<p>` elements starting with `Jl`, in page order.
///
/// Names are read from the parsed document, so `<p>` elements with attributes
/// count, while `<p>Jl...</p>` text inside a `<script>` does not. Camera ids are
/// matched on the raw HTML and do include script text, so a page that renders
/// cards from script shifts the positional pairing.
pub fn extract_location_names(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let paragraph_selector = Selector::parse("p").unwrap();
    document
        .select(&paragraph_selector)
        .filter(|p| p.children().all(|child| child.value().is_text()))
        .map(|p| p.text().collect::<String>())
        .filter(|text| text.starts_with("Jl"))
        .map(|text| text.trim().to_string())
        .collect()
}

/// Pair ids with names by index.
///
/// Nothing on the page ties a name to an id; this relies on both appearing in
/// the same order. Ids beyond the last name get `"CCTV <id>"`. Names beyond the
/// last id are dropped.
pub fn pair_positionally(ids: &[String], names: &[String]) -> Vec<(String, String)> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| {
            let name = names
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("CCTV {id}"));
            (id.clone(), name)
        })
        .collect()
}

/// Position of the first landmark whose keyword occurs in `name`, ignoring case.
pub fn resolve_position(name: &str, landmarks: &[Landmark], fallback: LatLng) -> LatLng {
    let name = name.to_lowercase();
    landmarks
        .iter()
        .find(|landmark| name.contains(&landmark.keyword.to_lowercase()))
        .map(Landmark::position)
        .unwrap_or(fallback)
}

/// Fill a stream URL template with a camera id.
pub fn stream_url(template: &str, camera_id: &str) -> String {
    template.replace("{id}", camera_id)
}
