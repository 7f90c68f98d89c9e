//! Data models for camera records and the sources that produce them.
//!
//! This module defines the core data structures used throughout the application:
//! - [`CameraRecord`]: The unified record every scraper emits
//! - [`Region`]: The administrative region a camera belongs to
//! - [`Source`]: Identifies one of the five upstream endpoints
//!
//! The serialized field names follow the JSON document consumed by the map
//! viewer, hence `streamUrl` in camelCase.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single traffic camera in the unified output schema.
///
/// Records are created by the scrapers, appended once to the run's output
/// and never mutated afterwards.
///
/// # Fields
///
/// * `id` - `<source-prefix>-<source-local-id>`, unique within one source
/// * `name` - Human-readable label prefixed with the source tag (e.g. `"KOTA - ..."`)
/// * `lat` / `lng` - WGS84 coordinates
/// * `stream_url` - Playable stream reference, possibly empty
/// * `region` - Administrative region label
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CameraRecord {
    /// Globally unique id, prefixed by the producing source.
    pub id: String,
    /// Display name, prefixed with the source tag.
    pub name: String,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
    /// Stream resource (HLS playlist or player page). May be empty.
    #[serde(rename = "streamUrl")]
    pub stream_url: String,
    /// Administrative region label.
    pub region: Region,
}

impl CameraRecord {
    /// The physical location a camera watches, without the source tag.
    ///
    /// `"KOTA - Simpang Dago - Arah Utara"` becomes `"Simpang Dago"`. The
    /// viewer groups cameras by this key.
    pub fn location_key(&self) -> &str {
        let without_tag = self
            .name
            .split_once(" - ")
            .map(|(_, rest)| rest)
            .unwrap_or(self.name.as_str());
        without_tag
            .split(" - ")
            .next()
            .unwrap_or(without_tag)
            .trim()
    }

    /// URL-friendly form of [`location_key`](Self::location_key).
    pub fn location_slug(&self) -> String {
        crate::utils::slugify(self.location_key())
    }
}

/// Administrative region a camera is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Region {
    #[serde(rename = "Kota Bandung")]
    KotaBandung,
    #[serde(rename = "Bandung Barat")]
    BandungBarat,
    #[serde(rename = "Kabupaten Bandung")]
    KabupatenBandung,
    #[serde(rename = "Kota Cimahi")]
    KotaCimahi,
}

impl Region {
    pub fn label(&self) -> &'static str {
        match self {
            Region::KotaBandung => "Kota Bandung",
            Region::BandungBarat => "Bandung Barat",
            Region::KabupatenBandung => "Kabupaten Bandung",
            Region::KotaCimahi => "Kota Cimahi",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One of the upstream endpoints, in aggregation order.
///
/// | Source | Endpoint | Method |
/// |--------|----------|--------|
/// | `Kota` | atcs-dishub.bandung.go.id | location → camera list → camera info |
/// | `Kbb` | atcs.bandungbaratkab.go.id | single JSON list |
/// | `Kab` | dishub.bandungkab.go.id | object literals scraped from a page |
/// | `Pelindung` | pelindung.bandung.go.id:8443 | JSON array, relaxed TLS |
/// | `Cimahi` | smartcity.cimahikota.go.id | page scrape + landmark lookup |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Source {
    Kota,
    Kbb,
    Kab,
    Pelindung,
    Cimahi,
}

impl Source {
    /// Every source, in the fixed order the aggregator runs them.
    pub const ALL: [Source; 5] = [
        Source::Kota,
        Source::Kbb,
        Source::Kab,
        Source::Pelindung,
        Source::Cimahi,
    ];

    /// Prefix of every record id produced by this source.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Source::Kota => "city",
            Source::Kbb => "kbb",
            Source::Kab => "kab",
            Source::Pelindung => "pelindung",
            Source::Cimahi => "cimahi",
        }
    }

    /// Tag prepended to every record name produced by this source.
    pub fn name_tag(&self) -> &'static str {
        match self {
            Source::Kota => "KOTA",
            Source::Kbb => "KBB",
            Source::Kab => "KAB",
            Source::Pelindung => "PELINDUNG",
            Source::Cimahi => "CIMAHI",
        }
    }

    pub fn region(&self) -> Region {
        match self {
            Source::Kota | Source::Pelindung => Region::KotaBandung,
            Source::Kbb => Region::BandungBarat,
            Source::Kab => Region::KabupatenBandung,
            Source::Cimahi => Region::KotaCimahi,
        }
    }

    /// Build a record id from one or more source-local id parts.
    pub fn record_id(&self, parts: &[&str]) -> String {
        let mut id = self.id_prefix().to_string();
        for part in parts {
            id.push('-');
            id.push_str(part);
        }
        id
    }

    /// Build a display name carrying this source's tag.
    pub fn record_name(&self, label: &str) -> String {
        format!("{} - {}", self.name_tag(), label)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Source::Kota => "kota",
            Source::Kbb => "kbb",
            Source::Kab => "kab",
            Source::Pelindung => "pelindung",
            Source::Cimahi => "cimahi",
        };
        f.write_str(name)
    }
}
