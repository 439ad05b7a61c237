//! Mapbox reverse geocoding payloads.

use reqwest::Url;
use serde::Deserialize;

use super::with_path;

/// Index of the place used as display name. Mapbox orders features from the
/// most specific (address, neighborhood) to the least specific (country).
pub const PLACE_NAME_DEPTH: usize = 2;

#[derive(Debug, Deserialize)]
pub struct MbResponse {
    #[serde(default)]
    pub features: Vec<MbFeature>,
}

#[derive(Debug, Deserialize)]
pub struct MbFeature {
    pub place_name: String,
}

impl MbResponse {
    pub fn place_name(&self, depth: usize) -> Option<&str> {
        self.features.get(depth).map(|f| f.place_name.as_str())
    }
}

pub fn reverse_url(base: &Url, lat: f64, lon: f64, token: &str) -> String {
    let position = format!("{lon},{lat}.json");
    let mut url = with_path(base, &["geocoding", "v5", "mapbox.places", &position]);
    url.query_pairs_mut().append_pair("access_token", token);
    url.into()
}
