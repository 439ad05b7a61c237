//! Remote providers: identifiers, URL builders and wire formats.

use std::{convert::TryFrom, fmt};

use reqwest::Url;

use crate::error::AcquisitionError;

pub mod ipapi;
pub mod mapbox;
pub mod openweather;
pub mod waqi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    /// World Air Quality Index: station index and city feeds.
    Waqi,
    /// Reverse geocoding.
    Mapbox,
    /// Air pollution history.
    OpenWeather,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Waqi => "waqi",
            ProviderId::Mapbox => "mapbox",
            ProviderId::OpenWeather => "openweather",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Waqi, ProviderId::Mapbox, ProviderId::OpenWeather]
    }

    /// Public token usable without registration, if the provider offers one.
    pub fn default_token(&self) -> Option<&'static str> {
        match self {
            ProviderId::Waqi => Some("demo"),
            ProviderId::Mapbox | ProviderId::OpenWeather => None,
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "waqi" => Ok(ProviderId::Waqi),
            "mapbox" => Ok(ProviderId::Mapbox),
            "openweather" => Ok(ProviderId::OpenWeather),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: waqi, mapbox, openweather."
            )),
        }
    }
}

/// Parse a configured base URL. Only hierarchical URLs are accepted, so
/// endpoint paths can always be appended to them.
pub fn parse_base(raw: &str) -> Result<Url, AcquisitionError> {
    let invalid = |reason: String| AcquisitionError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("not a hierarchical URL".to_string()));
    }
    Ok(url)
}

/// Append percent-encoded path segments to `base`, dropping its query.
pub(crate) fn with_path(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}
