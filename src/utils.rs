//! Utility functions for value parsing, string manipulation, and file system operations.
//!
//! This module provides helper functions used throughout the application:
//! - Coordinate and number parsing tolerant of the shapes the endpoints send
//! - String truncation and slugification for logging and location keys
//! - File system validation for the output directory

use crate::error::{Result, ScrapeError};
use serde_json::Value;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Parse `"lat, lng"` (optionally wrapped in `[...]`) into a coordinate pair.
///
/// Both components are trimmed. Trailing empty components (`"-6.9, 107.6,"`)
/// are ignored; anything other than exactly two finite numbers is an error.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(parse_coordinate_pair("-6.9, 107.6").unwrap(), (-6.9, 107.6));
/// assert!(parse_coordinate_pair("-6.9").is_err());
/// ```
pub fn parse_coordinate_pair(raw: &str) -> Result<(f64, f64)> {
    let malformed = || ScrapeError::Coordinates {
        raw: raw.to_string(),
    };
    let inner = raw.trim().trim_start_matches('[').trim_end_matches(']');
    let mut parts = inner.split(',').map(str::trim);
    let (Some(lat), Some(lng)) = (parts.next(), parts.next()) else {
        return Err(malformed());
    };
    if parts.any(|extra| !extra.is_empty()) {
        return Err(malformed());
    }
    let lat: f64 = lat.parse().map_err(|_| malformed())?;
    let lng: f64 = lng.parse().map_err(|_| malformed())?;
    if !lat.is_finite() || !lng.is_finite() {
        return Err(malformed());
    }
    Ok((lat, lng))
}

/// Read a JSON number that may arrive as a number, a numeric string, or not at all.
///
/// Absent, `null` and empty-string values default to `0.0`.
pub fn json_number(value: Option<&Value>, field: &'static str) -> Result<f64> {
    let invalid = |raw: String| ScrapeError::Number { field, raw };
    match value {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| invalid(n.to_string())),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(0.0),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| invalid(s.clone())),
        Some(other) => Err(invalid(other.to_string())),
    }
}

/// Render a JSON scalar as text. Absent and `null` become the empty string.
pub fn json_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to at most `max` bytes (on a char boundary) with
/// an ellipsis and byte count indicator appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Convert a label to a URL-friendly slug.
///
/// Lowercases, turns whitespace runs into single hyphens, and drops anything
/// that is not a word character or hyphen.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify("Simpang Dago"), "simpang-dago");
/// assert_eq!(slugify("Jl. Cimindi Raya"), "jl-cimindi-raya");
/// ```
pub fn slugify(label: &str) -> String {
    label
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

const WRITE_CHECK_FILE: &str = "..__write_check__";

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a scratch file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<()> {
    if !fs::try_exists(path).await? {
        info!("Creating data directory");
        fs::create_dir_all(path).await?;
    }
    // Try a small sync write using std fs (simpler error surface)
    let scratch_path = path.join(WRITE_CHECK_FILE);
    stdfs::File::create(&scratch_path)?;
    let _ = stdfs::remove_file(&scratch_path);
    info!("Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_coordinate_pair() {
        assert_eq!(parse_coordinate_pair("-6.9, 107.6").unwrap(), (-6.9, 107.6));
        assert_eq!(parse_coordinate_pair(" -6.9,107.6 ").unwrap(), (-6.9, 107.6));
        assert_eq!(parse_coordinate_pair("[-6.9, 107.6]").unwrap(), (-6.9, 107.6));
    }

    #[test]
    fn test_parse_coordinate_pair_trailing_comma() {
        assert_eq!(parse_coordinate_pair("-6.84, 107.47, ").unwrap(), (-6.84, 107.47));
        assert_eq!(parse_coordinate_pair("[-6.9, 107.6,]").unwrap(), (-6.9, 107.6));
        assert!(parse_coordinate_pair("a,b,").is_err());
        assert!(parse_coordinate_pair("-6.9,,107.6").is_err());
    }

    #[test]
    fn test_parse_coordinate_pair_malformed() {
        assert!(parse_coordinate_pair("-6.9").is_err());
        assert!(parse_coordinate_pair("").is_err());
        assert!(parse_coordinate_pair("a,b").is_err());
        assert!(parse_coordinate_pair("1,2,3").is_err());
        assert!(parse_coordinate_pair("NaN,1").is_err());
    }

    #[test]
    fn test_json_number() {
        assert_eq!(json_number(Some(&json!(-6.9)), "lat").unwrap(), -6.9);
        assert_eq!(json_number(Some(&json!(" 107.6 ")), "lng").unwrap(), 107.6);
        assert_eq!(json_number(None, "lat").unwrap(), 0.0);
        assert_eq!(json_number(Some(&json!(null)), "lat").unwrap(), 0.0);
        assert_eq!(json_number(Some(&json!("")), "lat").unwrap(), 0.0);
        assert!(json_number(Some(&json!("north")), "lat").is_err());
        assert!(json_number(Some(&json!([1])), "lat").is_err());
    }

    #[test]
    fn test_json_text() {
        assert_eq!(json_text(Some(&json!("abc"))), "abc");
        assert_eq!(json_text(Some(&json!(12))), "12");
        assert_eq!(json_text(None), "");
        assert_eq!(json_text(Some(&json!(null))), "");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_char_boundary() {
        let result = truncate_for_log("ééé", 3);
        assert!(result.starts_with('é'));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Simpang Dago"), "simpang-dago");
        assert_eq!(slugify("Jl. Cimindi  Raya"), "jl-cimindi-raya");
        assert_eq!(slugify("Pasteur (Tol)"), "pasteur-tol");
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("src").join("data");
        ensure_writable_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert!(!nested.join(WRITE_CHECK_FILE).exists());
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_keeps_existing_contents() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("cctvs.json"), "[]").unwrap();
        ensure_writable_dir(tmp.path()).await.unwrap();
        assert_eq!(std::fs::read_to_string(tmp.path().join("cctvs.json")).unwrap(), "[]");
        assert!(!tmp.path().join(WRITE_CHECK_FILE).exists());
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_rejects_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("not-a-dir");
        std::fs::write(&file, "x").unwrap();
        assert!(ensure_writable_dir(&file).await.is_err());
    }
}
