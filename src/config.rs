//! Scraper configuration: endpoints, HTTP settings and the Cimahi landmark table.
//!
//! Every field has a built-in default matching the live municipal endpoints,
//! so the application runs without any config file. A YAML file passed with
//! `--config` overrides any subset of the defaults:
//!
//! ```yaml
//! http:
//!   timeout_secs: 15
//! kota:
//!   location_delay_ms: 100
//! cimahi:
//!   landmarks:
//!     - { keyword: "Cimindi", lat: -6.8965, lng: 107.5605 }
//!     - { keyword: "Melong", lat: -6.9203, lng: 107.5698 }
//! ```
//!
//! The landmark list is ordered: the first keyword found in a camera name wins.

use crate::error::Result;
use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Top-level configuration for one scraping run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub http: HttpSettings,
    pub kota: KotaConfig,
    pub kbb: KbbConfig,
    pub kab: KabConfig,
    pub pelindung: PelindungConfig,
    pub cimahi: CimahiConfig,
}

/// Settings shared by every outbound HTTP client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub user_agent: String,
    /// Value of the `X-Requested-With` header; the ATCS endpoints only answer AJAX-looking requests.
    pub requested_with: Option<String>,
    /// Ceiling for a single request, connect included.
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            requested_with: Some("XMLHttpRequest".to_string()),
            timeout_secs: 10,
        }
    }
}

/// ATCS Kota Bandung.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct KotaConfig {
    /// Site root; `ajax/lokasi`, `ajax/cctv-list` and `ajax/cctv-info` are resolved against it.
    pub base_url: String,
    /// Pause between two locations.
    pub location_delay_ms: u64,
}

impl Default for KotaConfig {
    fn default() -> Self {
        Self {
            base_url: "https://atcs-dishub.bandung.go.id/".to_string(),
            location_delay_ms: 50,
        }
    }
}

/// ATCS Kabupaten Bandung Barat.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct KbbConfig {
    pub url: String,
}

impl Default for KbbConfig {
    fn default() -> Self {
        Self {
            url: "https://atcs.bandungbaratkab.go.id/get-cctv".to_string(),
        }
    }
}

/// Dishub Kabupaten Bandung.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct KabConfig {
    pub url: String,
}

impl Default for KabConfig {
    fn default() -> Self {
        Self {
            url: "https://dishub.bandungkab.go.id/cctv/".to_string(),
        }
    }
}

/// Pelindung Kota Bandung.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PelindungConfig {
    pub url: String,
    /// The endpoint serves a certificate that does not validate. Scoped to this source only.
    pub accept_invalid_certs: bool,
}

impl Default for PelindungConfig {
    fn default() -> Self {
        Self {
            url: "https://pelindung.bandung.go.id:8443/api/cek".to_string(),
            accept_invalid_certs: true,
        }
    }
}

/// A coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A keyword matched case-insensitively against camera names, and where it is.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Landmark {
    pub keyword: String,
    pub lat: f64,
    pub lng: f64,
}

impl Landmark {
    pub fn new(keyword: &str, lat: f64, lng: f64) -> Self {
        Self {
            keyword: keyword.to_string(),
            lat,
            lng,
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// Kota Cimahi smart city portal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CimahiConfig {
    pub page_url: String,
    /// Playlist URL with every `{id}` replaced by the camera id.
    pub stream_url_template: String,
    /// Used when no landmark keyword matches.
    pub fallback: LatLng,
    pub landmarks: Vec<Landmark>,
}

impl Default for CimahiConfig {
    fn default() -> Self {
        Self {
            page_url: "https://smartcity.cimahikota.go.id/cctv".to_string(),
            stream_url_template: "https://smartcity.cimahikota.go.id/video/{id}/video{id}.m3u8"
                .to_string(),
            fallback: LatLng::new(-6.8747, 107.5396),
            landmarks: default_cimahi_landmarks(),
        }
    }
}

/// Known Cimahi intersections, in match priority order.
pub fn default_cimahi_landmarks() -> Vec<Landmark> {
    vec![
        Landmark::new("Bunderan Pemkot", -6.873020190339506, 107.55486525311575),
        Landmark::new("Cimindi", -6.89647988119668, 107.56045292954839),
        Landmark::new("Pasar Atas", -6.870289335243315, 107.54360928338612),
        Landmark::new("Cihanjuang", -6.878116774285018, 107.54929931957862),
        Landmark::new("Kebon Kopi", -6.904906367366839, 107.56561572466714),
        Landmark::new("Citeureup", -6.8612250331310385, 107.54458679660554),
        Landmark::new("Melong", -6.920302209533734, 107.56979081642228),
    ]
}

/// Load configuration from an optional YAML file, falling back to defaults.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid YAML for
/// [`ScraperConfig`].
#[instrument(level = "info")]
pub async fn load_config(path: Option<&Path>) -> Result<ScraperConfig> {
    let Some(path) = path else {
        info!("No config file given; using built-in endpoints");
        return Ok(ScraperConfig::default());
    };
    let raw = fs::read_to_string(path).await?;
    let config = parse_config(&raw)?;
    info!(
        path = %path.display(),
        landmarks = config.cimahi.landmarks.len(),
        "Loaded configuration"
    );
    Ok(config)
}

/// Parse YAML text into a [`ScraperConfig`]. Absent keys keep their defaults.
pub fn parse_config(raw: &str) -> Result<ScraperConfig> {
    if raw.trim().is_empty() {
        return Ok(ScraperConfig::default());
    }
    Ok(serde_yaml::from_str(raw)?)
}
