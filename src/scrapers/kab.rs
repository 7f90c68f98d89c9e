//! Dishub Kabupaten Bandung scraper.
//!
//! The CCTV page embeds its camera list as a JavaScript array of object literals:
//!
//! ```text
//! { id: 1, name: "SIMPANG SOREANG", code: "SP", coordinates: [-7.02, 107.52], streamUrl: "https://..." }
//! ```
//!
//! The page is not valid JSON, so each literal is matched with a regex that
//! tolerates whitespace between tokens but otherwise expects this exact shape.

use crate::config::KabConfig;
use crate::error::Result;
use crate::http::get_text;
use crate::models::{CameraRecord, Source};
use crate::utils::parse_coordinate_pair;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use reqwest::Client;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

const SOURCE: Source = Source::Kab;

static CAMERA_LITERAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\{\s*id:\s*(\d+),\s*name:\s*"([^"]+)",\s*code:\s*"([^"]*)",\s*coordinates:\s*\[([^\]]+)\],\s*streamUrl:\s*"([^"]+)"\s*\}"#,
    )
    .unwrap()
});

/// Scrape every camera from the Dishub Kabupaten Bandung page.
#[instrument(level = "info", skip_all, fields(source = %SOURCE))]
pub async fn scrape(client: &Client, config: &KabConfig) -> Result<Vec<CameraRecord>> {
    info!("Scraping Dishub Kabupaten Bandung");
    let html = get_text(client, &config.url).await?;
    let records = extract_cameras(&html);
    info!(count = records.len(), "Scraped Dishub Kabupaten Bandung");
    Ok(records)
}

/// Extract every camera object literal found in `html`, in page order.
///
/// A literal whose coordinate list is not two numbers is skipped. A camera id
/// seen twice keeps only its first record.
pub fn extract_cameras(html: &str) -> Vec<CameraRecord> {
    let mut seen = HashSet::new();
    CAMERA_LITERAL_RE
        .captures_iter(html)
        .filter_map(|caps| {
            let record = match build_record(&caps) {
                Ok(record) => record,
                Err(e) => {
                    warn!(literal = %&caps[0], error = %e, "Skipping camera");
                    return None;
                }
            };
            if !seen.insert(record.id.clone()) {
                warn!(camera = %record.id, "Duplicate camera id; keeping the first");
                return None;
            }
            Some(record)
        })
        .collect()
}

fn build_record(caps: &Captures<'_>) -> Result<CameraRecord> {
    let (lat, lng) = parse_coordinate_pair(&caps[4])?;
    debug!(id = %&caps[1], code = %&caps[3], "Matched camera literal");
    Ok(CameraRecord {
        id: SOURCE.record_id(&[&caps[1]]),
        name: SOURCE.record_name(&caps[2]),
        lat,
        lng,
        stream_url: caps[5].to_string(),
        region: SOURCE.region(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpSettings;
    use crate::http::{Trust, build_client};
    use crate::models::Region;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_extract_single_literal() {
        let snippet = r#"{ id: 7, name: "Jl. Test", code: "T1", coordinates: [-6.9, 107.6], streamUrl: "http://x/y.m3u8" }"#;
        let records = extract_cameras(snippet);
        assert_eq!(
            records,
            vec![CameraRecord {
                id: "kab-7".to_string(),
                name: "KAB - Jl. Test".to_string(),
                lat: -6.9,
                lng: 107.6,
                stream_url: "http://x/y.m3u8".to_string(),
                region: Region::KabupatenBandung,
            }]
        );
    }

    #[test]
    fn test_extract_tolerates_whitespace_and_surrounding_script() {
        let html = r#"
            <script>
            const cctvData = [
                {
                    id: 1,
                    name: "SIMPANG SOREANG",
                    code: "",
                    coordinates: [ -7.0251 , 107.5198 ],
                    streamUrl: "https://cctv.bandungkab.go.id/soreang/index.m3u8"
                },
                {id:2,name:"BANJARAN",code:"BJR",coordinates:[-7.04,107.59],streamUrl:"https://cctv.bandungkab.go.id/banjaran/index.m3u8"}
            ];
            </script>
        "#;
        let records = extract_cameras(html);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["kab-1", "kab-2"]);
        assert_eq!(records[0].lat, -7.0251);
        assert_eq!(records[0].lng, 107.5198);
    }

    #[test]
    fn test_bad_coordinates_skip_only_that_literal() {
        let html = r#"
            { id: 1, name: "A", code: "", coordinates: [-7.0], streamUrl: "http://a" }
            { id: 2, name: "B", code: "", coordinates: [-7.1, 107.5], streamUrl: "http://b" }
        "#;
        let records = extract_cameras(html);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "kab-2");
    }

    #[test]
    fn test_trailing_comma_in_coordinates() {
        let snippet = r#"{ id: 7, name: "Jl. Test", code: "T1", coordinates: [-6.9, 107.6,], streamUrl: "http://x/y.m3u8" }"#;
        let records = extract_cameras(snippet);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "kab-7");
        assert_eq!((records[0].lat, records[0].lng), (-6.9, 107.6));
    }

    #[test]
    fn test_repeated_id_keeps_first_literal() {
        let html = r#"
            { id: 7, name: "First", code: "", coordinates: [-6.9, 107.6], streamUrl: "http://x/1.m3u8" }
            { id: 8, name: "Other", code: "", coordinates: [-6.8, 107.5], streamUrl: "http://x/2.m3u8" }
            { id: 7, name: "Second", code: "", coordinates: [-7.0, 107.7], streamUrl: "http://x/3.m3u8" }
        "#;
        let records = extract_cameras(html);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["kab-7", "kab-8"]);
        assert_eq!(records[0].name, "KAB - First");
    }

    #[test]
    fn test_no_literals() {
        assert!(extract_cameras("<html><body>Maintenance</body></html>").is_empty());
    }

    #[tokio::test]
    async fn test_scrape_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cctv/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"var d = [{ id: 3, name: "Cileunyi", code: "CL", coordinates: [-6.94, 107.75], streamUrl: "http://s/3.m3u8" }];"#,
            ))
            .mount(&server)
            .await;

        let client = build_client(&HttpSettings::default(), Trust::Strict).unwrap();
        let config = KabConfig {
            url: format!("{}/cctv/", server.uri()),
        };
        let records = scrape(&client, &config).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "KAB - Cileunyi");
    }
}
