//! Per-source scrapers for the municipal CCTV endpoints.
//!
//! Each scraper fetches its endpoint(s) and maps whatever it finds into
//! [`CameraRecord`](crate::models::CameraRecord)s.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | ATCS Kota Bandung | [`kota`] | 3-step AJAX API | One location can hold several cameras |
//! | ATCS Bandung Barat | [`kbb`] | JSON list | Player links rewritten to HLS playlists |
//! | Dishub Kab. Bandung | [`kab`] | Regex over inline JS | Object literals, not JSON |
//! | Pelindung Kota Bandung | [`pelindung`] | JSON array | TLS verification disabled for this host |
//! | Smart City Cimahi | [`cimahi`] | HTML + regex | Coordinates from a landmark table |
//!
//! # Common Patterns
//!
//! Each scraper module exports:
//! - `scrape(...)`: Fetches and maps one source, returns `Result<Vec<CameraRecord>>`
//! - a pure parsing function (`parse_response`, `extract_cameras`, ...) testable offline
//!
//! Scrapers use:
//! - One `Err` for the whole source when the endpoint is unreachable or its
//!   top-level response is unusable
//! - Per-record isolation otherwise: a bad record is logged with `warn!` and skipped

pub mod cimahi;
pub mod kab;
pub mod kbb;
pub mod kota;
pub mod pelindung;
