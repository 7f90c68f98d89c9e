//! HTTP client construction and small request helpers.
//!
//! All scrapers share one strict client. The Pelindung scraper builds its own
//! client with [`Trust::AcceptInvalidCerts`] because that endpoint serves a
//! certificate that does not validate; no other source ever sees that client.

use crate::config::HttpSettings;
use crate::error::{Result, ScrapeError};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// TLS verification mode for a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trust {
    /// Normal certificate validation.
    Strict,
    /// Skip certificate validation. Only for endpoints known to need it.
    AcceptInvalidCerts,
}

/// Build a client carrying the browser-like headers the municipal endpoints expect.
///
/// # Errors
///
/// Returns an error if a configured header value is not a valid HTTP header
/// or the TLS backend cannot be initialised.
#[instrument(level = "debug", skip(settings))]
pub fn build_client(settings: &HttpSettings, trust: Trust) -> Result<Client> {
    let mut headers = HeaderMap::new();
    if let Some(requested_with) = &settings.requested_with {
        headers.insert("X-Requested-With", HeaderValue::from_str(requested_with)?);
    }

    let mut builder = Client::builder()
        .user_agent(settings.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(settings.timeout_secs));

    if trust == Trust::AcceptInvalidCerts {
        warn!("Building HTTP client with TLS certificate validation disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }

    Ok(builder.build()?)
}

/// GET `url` and return the body, treating any non-2xx status as an error.
#[instrument(level = "debug", skip(client))]
pub async fn get_text(client: &Client, url: &str) -> Result<String> {
    let res = client.get(url).send().await?;
    read_body(res, url).await
}

/// POST an urlencoded form to `url` and return the body, treating any non-2xx status as an error.
#[instrument(level = "debug", skip(client))]
pub async fn post_form_text(client: &Client, url: &str, form: &[(&str, &str)]) -> Result<String> {
    let res = client.post(url).form(form).send().await?;
    read_body(res, url).await
}

async fn read_body(res: reqwest::Response, url: &str) -> Result<String> {
    let status = res.status();
    if !status.is_success() {
        return Err(ScrapeError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    let body = res.text().await?;
    debug!(%url, bytes = body.len(), "Fetched body");
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> Client {
        build_client(&HttpSettings::default(), Trust::Strict).unwrap()
    }

    #[test]
    fn test_build_relaxed_client() {
        assert!(build_client(&HttpSettings::default(), Trust::AcceptInvalidCerts).is_ok());
    }

    #[test]
    fn test_invalid_header_value_is_error() {
        let settings = HttpSettings {
            requested_with: Some("bad\nvalue".to_string()),
            ..HttpSettings::default()
        };
        assert!(matches!(
            build_client(&settings, Trust::Strict),
            Err(ScrapeError::Header(_))
        ));
    }

    #[tokio::test]
    async fn test_get_text_sends_ajax_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("X-Requested-With", "XMLHttpRequest"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let body = get_text(&client(), &format!("{}/page", server.uri())).await.unwrap();
        assert_eq!(body, "hello");
    }

    #[tokio::test]
    async fn test_post_form_text_encodes_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ajax/cctv-info"))
            .and(body_string("id=42"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        let body = post_form_text(&client(), &format!("{}/ajax/cctv-info", server.uri()), &[("id", "42")])
            .await
            .unwrap();
        assert_eq!(body, "{}");
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = get_text(&client(), &server.uri()).await.unwrap_err();
        assert!(matches!(err, ScrapeError::UnexpectedStatus { status: 503, .. }));
    }
}
