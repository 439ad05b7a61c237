use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Every way the acquisition layer can fail to obtain data.
///
/// None of these escape to callers of the assemblers: they are logged and
/// turned into fallback data or an empty result.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("{url} responded with status {status}: {body}")]
    HttpError {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("failed to parse response from {origin}: {source}")]
    ParseError {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{origin} rejected the request: {message}")]
    Rejected { origin: String, message: String },

    #[error("invalid endpoint base URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to read fallback document {path}: {source}")]
    FallbackIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("geolocation unavailable: {0}")]
    GeolocationUnavailable(String),

    #[error("geocode lookup failed for ({lat}, {lon}): {reason}")]
    GeocodeLookupFailure { lat: f64, lon: f64, reason: String },
}

impl AcquisitionError {
    pub fn geocode<S: Into<String>>(lat: f64, lon: f64, reason: S) -> Self {
        Self::GeocodeLookupFailure {
            lat,
            lon,
            reason: reason.into(),
        }
    }

    pub fn geolocation<S: Into<String>>(message: S) -> Self {
        Self::GeolocationUnavailable(message.into())
    }
}

/// Strip the query string so tokens never end up in logs or error messages.
pub(crate) fn display_url(url: &str) -> String {
    match url.split_once('?') {
        Some((path, _)) => format!("{path}?…"),
        None => url.to_string(),
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
