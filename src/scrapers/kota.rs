//! ATCS Kota Bandung scraper.
//!
//! This module scrapes [ATCS Dishub Kota Bandung](https://atcs-dishub.bandung.go.id),
//! whose map page resolves cameras in three AJAX steps:
//!
//! 1. `POST ajax/lokasi` returns every physical location with its coordinates.
//! 2. `POST ajax/cctv-list` (form `id=<location>`) returns an HTML fragment whose
//!    buttons call `showStreamingModal(<camera id>)`.
//! 3. `POST ajax/cctv-info` (form `id=<camera>`) returns `{"src": "<stream>"}`.
//!
//! A location can host several cameras, so record ids are
//! `city-<location id>-<camera id>`.

use crate::config::KotaConfig;
use crate::error::{Result, ScrapeError};
use crate::http::post_form_text;
use crate::models::{CameraRecord, Source};
use crate::utils::{json_number, json_text, truncate_for_log};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::Url;

const SOURCE: Source = Source::Kota;

static STREAMING_MODAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"showStreamingModal\((\d+)\)").unwrap());

/// One entry of the `ajax/lokasi` response.
#[derive(Debug, Deserialize)]
struct Location {
    #[serde(default)]
    id_lokasi: Option<Value>,
    #[serde(default)]
    nama_lokasi: Option<Value>,
    #[serde(default)]
    lat_lokasi: Option<Value>,
    #[serde(default)]
    lon_lokasi: Option<Value>,
}

impl Location {
    fn id(&self) -> String {
        json_text(self.id_lokasi.as_ref())
    }

    fn name(&self) -> String {
        json_text(self.nama_lokasi.as_ref())
    }

    /// Coordinates are mandatory here: a location without them is skipped, not placed at 0,0.
    fn position(&self) -> Result<(f64, f64)> {
        let lat = self.lat_lokasi.as_ref().filter(|v| !v.is_null());
        let lng = self.lon_lokasi.as_ref().filter(|v| !v.is_null());
        match (lat, lng) {
            (Some(lat), Some(lng)) => Ok((
                json_number(Some(lat), "lat_lokasi")?,
                json_number(Some(lng), "lon_lokasi")?,
            )),
            _ => Err(ScrapeError::Coordinates {
                raw: format!("{:?}, {:?}", self.lat_lokasi, self.lon_lokasi),
            }),
        }
    }
}

/// The `ajax/cctv-info` response.
#[derive(Debug, Deserialize)]
struct CameraInfo {
    #[serde(default)]
    src: Option<Value>,
}

/// Resolved endpoint URLs.
struct Endpoints {
    locations: Url,
    camera_list: Url,
    camera_info: Url,
}

impl Endpoints {
    fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)?;
        Ok(Self {
            locations: base.join("ajax/lokasi")?,
            camera_list: base.join("ajax/cctv-list")?,
            camera_info: base.join("ajax/cctv-info")?,
        })
    }
}

/// Scrape every camera from ATCS Kota Bandung.
///
/// Failing to fetch or parse the location list, or losing the connection
/// midway, aborts the whole source. A location or camera whose response is
/// unusable is logged and skipped. A location id listed twice is only
/// resolved once.
///
/// # Returns
///
/// Records in location order, then first-seen camera order within a location.
#[instrument(level = "info", skip_all, fields(source = %SOURCE))]
pub async fn scrape(client: &Client, config: &KotaConfig) -> Result<Vec<CameraRecord>> {
    info!("Scraping ATCS Kota Bandung");
    let endpoints = Endpoints::new(&config.base_url)?;

    let body = post_form_text(client, endpoints.locations.as_str(), &[]).await?;
    let locations: Vec<Location> = serde_json::from_str(&body).inspect_err(|e| {
        warn!(error = %e, body = %truncate_for_log(&body, 300), "Location list is not the expected JSON");
    })?;
    info!(count = locations.len(), "Fetched locations");

    let delay = Duration::from_millis(config.location_delay_ms);
    let mut seen = HashSet::new();
    let mut records = Vec::new();
    for location in &locations {
        let location_id = location.id();
        if !seen.insert(location_id.clone()) {
            warn!(location = %location_id, "Duplicate location id; keeping the first");
            continue;
        }
        if seen.len() > 1 && !delay.is_zero() {
            sleep(delay).await;
        }
        records.extend(scrape_location(client, &endpoints, location).await?);
    }

    info!(
        locations = locations.len(),
        count = records.len(),
        "Scraped ATCS Kota Bandung"
    );
    Ok(records)
}

/// Resolve all cameras at one location.
///
/// Only transport errors are returned; anything else skips the location or camera.
#[instrument(level = "debug", skip_all, fields(location = %location.id()))]
async fn scrape_location(
    client: &Client,
    endpoints: &Endpoints,
    location: &Location,
) -> Result<Vec<CameraRecord>> {
    let location_id = location.id();
    let (lat, lng) = match location.position() {
        Ok(position) => position,
        Err(e) => {
            warn!(location = %location_id, error = %e, "Skipping location without usable coordinates");
            return Ok(Vec::new());
        }
    };

    let list = post_form_text(client, endpoints.camera_list.as_str(), &[("id", location_id.as_str())]).await;
    let list = match list {
        Ok(body) => body,
        Err(e) if e.is_transport() => return Err(e),
        Err(e) => {
            warn!(location = %location_id, error = %e, "Camera list request failed; skipping location");
            return Ok(Vec::new());
        }
    };

    let camera_ids = extract_camera_ids(&list);
    debug!(location = %location_id, cameras = camera_ids.len(), "Found cameras");

    let name = SOURCE.record_name(&location.name());
    let mut records = Vec::with_capacity(camera_ids.len());
    for camera_id in camera_ids {
        match fetch_stream_url(client, endpoints, &camera_id).await {
            Ok(stream_url) => records.push(CameraRecord {
                id: SOURCE.record_id(&[location_id.as_str(), camera_id.as_str()]),
                name: name.clone(),
                lat,
                lng,
                stream_url,
                region: SOURCE.region(),
            }),
            Err(e) if e.is_transport() => return Err(e),
            Err(e) => {
                warn!(location = %location_id, camera = %camera_id, error = %e, "Skipping camera");
            }
        }
    }
    Ok(records)
}

async fn fetch_stream_url(client: &Client, endpoints: &Endpoints, camera_id: &str) -> Result<String> {
    let body = post_form_text(client, endpoints.camera_info.as_str(), &[("id", camera_id)]).await?;
    let info: CameraInfo = serde_json::from_str(&body)?;
    Ok(json_text(info.src.as_ref()))
}

/// Extract camera ids from a `cctv-list` fragment.
///
/// The same camera usually appears on several buttons; duplicates are dropped,
/// keeping the first occurrence so the output order is stable.
pub fn extract_camera_ids(fragment: &str) -> Vec<String> {
    STREAMING_MODAL_RE
        .captures_iter(fragment)
        .map(|caps| caps[1].to_string())
        .unique()
        .collect()
}
