//! Error types shared by the scrapers, the aggregator and the JSON sink.
//!
//! Scrapers distinguish two scopes of failure:
//! - An error returned from a scraper's `scrape` entry point is fatal for that
//!   source only; the aggregator logs it and carries on with zero records.
//! - An error returned while building a single record is logged and that record
//!   is skipped; sibling records are unaffected.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("endpoint reported status {0:?}")]
    Rejected(String),

    #[error("malformed coordinate pair {raw:?}")]
    Coordinates { raw: String },

    #[error("field {field} is not a number: {raw:?}")]
    Number { field: &'static str, raw: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

impl ScrapeError {
    /// Whether the error means the endpoint itself is unreachable.
    ///
    /// Scrapers abort the whole source on these instead of skipping a record.
    pub fn is_transport(&self) -> bool {
        matches!(self, ScrapeError::Http(e) if e.is_connect() || e.is_timeout() || e.is_request())
    }
}
