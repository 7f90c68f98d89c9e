//! JSON output for the map viewer.
//!
//! The whole camera list is written as one pretty-printed (4-space indent)
//! array to `<data-dir>/cctvs.json`. Every run replaces the file completely;
//! the new content is written to a temporary sibling first and renamed into
//! place so readers never see a half-written document.

use crate::error::Result;
use crate::models::CameraRecord;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// File name of the snapshot inside the data directory.
pub const OUTPUT_FILE: &str = "cctvs.json";

/// Serialize records as a 4-space-indented JSON array.
pub fn to_pretty_json(records: &[CameraRecord]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    records.serialize(&mut serializer)?;
    Ok(buf)
}

/// Write the camera list to `{data_dir}/cctvs.json`, creating `data_dir` if needed.
///
/// The binary has already created the directory through
/// [`ensure_writable_dir`](crate::utils::ensure_writable_dir); this only matters
/// for callers that skip that check.
///
/// # Returns
///
/// The path of the written file.
#[instrument(level = "info", skip_all, fields(data_dir = %data_dir.display(), count = records.len()))]
pub async fn write_cameras(records: &[CameraRecord], data_dir: &Path) -> Result<PathBuf> {
    let json = to_pretty_json(records)?;

    if let Err(e) = fs::create_dir_all(data_dir).await {
        error!(error = %e, "Failed to create data directory");
        return Err(e.into());
    }

    let path = data_dir.join(OUTPUT_FILE);
    let tmp_path = data_dir.join(format!("{OUTPUT_FILE}.tmp"));
    fs::write(&tmp_path, json).await?;
    fs::rename(&tmp_path, &path).await?;
    info!(path = %path.display(), "Wrote camera list");

    Ok(path)
}

/// Read a camera list previously written by [`write_cameras`].
#[instrument(level = "debug")]
pub async fn read_cameras(path: &Path) -> Result<Vec<CameraRecord>> {
    let raw = fs::read(path).await?;
    Ok(serde_json::from_slice(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Region;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use std::collections::BTreeSet;

    fn sample() -> Vec<CameraRecord> {
        vec![
            CameraRecord {
                id: "kab-7".to_string(),
                name: "KAB - Jl. Test".to_string(),
                lat: -6.9,
                lng: 107.6,
                stream_url: "http://x/y.m3u8".to_string(),
                region: Region::KabupatenBandung,
            },
            CameraRecord {
                id: "pelindung-3".to_string(),
                name: "PELINDUNG - Pasteur".to_string(),
                lat: 0.0,
                lng: 0.0,
                stream_url: String::new(),
                region: Region::KotaBandung,
            },
        ]
    }

    #[test]
    fn test_to_pretty_json_uses_four_space_indent() {
        let json = String::from_utf8(to_pretty_json(&sample()).unwrap()).unwrap();
        assert!(json.starts_with("[\n    {\n        \"id\": \"kab-7\""));
        assert!(json.contains("\"streamUrl\": \"http://x/y.m3u8\""));
    }

    #[test]
    fn test_to_pretty_json_empty() {
        assert_eq!(to_pretty_json(&[]).unwrap(), b"[]");
    }

    #[tokio::test]
    async fn test_write_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let data_dir = tmp.path().join("src").join("data");
        let path = write_cameras(&sample(), &data_dir).await.unwrap();
        assert_eq!(path, data_dir.join("cctvs.json"));
        assert!(path.is_file());
        assert!(!data_dir.join("cctvs.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_round_trip_field_set() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_cameras(&sample(), tmp.path()).await.unwrap();

        let raw: Value = serde_json::from_slice(&tokio::fs::read(&path).await.unwrap()).unwrap();
        let expected: BTreeSet<&str> = ["id", "name", "lat", "lng", "streamUrl", "region"].into();
        for object in raw.as_array().unwrap() {
            let keys: BTreeSet<&str> = object.as_object().unwrap().keys().map(String::as_str).collect();
            assert_eq!(keys, expected);
        }

        assert_eq!(read_cameras(&path).await.unwrap(), sample());
    }

    #[tokio::test]
    async fn test_write_replaces_previous_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        write_cameras(&sample(), tmp.path()).await.unwrap();
        let path = write_cameras(&sample()[..1], tmp.path()).await.unwrap();
        assert_eq!(read_cameras(&path).await.unwrap().len(), 1);
    }
}
