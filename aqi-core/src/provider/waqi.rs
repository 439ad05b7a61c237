//! World Air Quality Index (api.waqi.info) payloads.

use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use super::with_path;
use crate::model::{Coordinates, Snapshot};

/// Every WAQI response is wrapped in `{ "status": "...", "data": ... }`.
/// On errors `data` is a message string instead of an object.
#[derive(Debug, Deserialize)]
pub struct WaqiEnvelope {
    pub status: String,
    #[serde(default)]
    pub data: Value,
}

impl WaqiEnvelope {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    /// Accept only `"ok"` envelopes; anything else carries the provider's
    /// message, e.g. "Over quota" or "Invalid key".
    pub fn check(&self) -> Result<(), String> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(self.message())
        }
    }

    /// Provider-side message for non-ok envelopes.
    pub fn message(&self) -> String {
        match &self.data {
            Value::String(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// Station entry as delivered by the map/bounds endpoint, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStation {
    pub uid: Option<i64>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(default)]
    pub aqi: Value,
}

pub fn index_url(base: &Url, token: &str) -> String {
    let mut url = with_path(base, &["v2", "map", "bounds"]);
    url.query_pairs_mut()
        .append_pair("latlng", "-90,-180,90,180")
        .append_pair("networks", "all")
        .append_pair("token", token);
    url.into()
}

/// The trailing empty segment keeps the slash WAQI expects after the city.
pub fn feed_url(base: &Url, city: &str, token: &str) -> String {
    let mut url = with_path(base, &["feed", city, ""]);
    url.query_pairs_mut().append_pair("token", token);
    url.into()
}

/// Extract station entries from an index payload.
///
/// `data` is either a list of entries or a map keyed by station id. Entries
/// that don't even look like a station object are dropped here; index
/// validation happens later.
pub fn station_entries(data: Value) -> Vec<RawStation> {
    let entries: Vec<Value> = match data {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<RawStation>(entry).ok())
        .collect()
}

/// WAQI reports the index as a number, a numeric string, or "-" when the
/// station has no current reading.
pub fn parse_aqi(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct WaqiFeed {
    #[serde(default)]
    aqi: Value,
    #[serde(default)]
    city: WaqiCity,
    dominentpol: Option<String>,
    time: Option<WaqiTime>,
}

#[derive(Debug, Default, Deserialize)]
struct WaqiCity {
    name: Option<String>,
    geo: Option<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct WaqiTime {
    s: Option<String>,
    iso: Option<String>,
}

/// Decode the `data` object of a city feed.
pub fn snapshot_from_feed(data: Value) -> Result<Snapshot, serde_json::Error> {
    let feed: WaqiFeed = serde_json::from_value(data)?;

    let coordinates = feed
        .city
        .geo
        .as_deref()
        .and_then(|geo| match geo {
            [lat, lon, ..] => Some(Coordinates::new(*lat, *lon)),
            _ => None,
        })
        .filter(Coordinates::is_valid);

    Ok(Snapshot {
        station_name: feed.city.name.unwrap_or_default(),
        aqi: parse_aqi(&feed.aqi),
        coordinates,
        dominant_pollutant: feed.dominentpol.filter(|p| !p.is_empty()),
        observed_at: feed.time.and_then(|t| t.iso.or(t.s)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_aqi_accepts_numbers_and_numeric_strings() {
        assert_eq!(parse_aqi(&json!(57)), Some(57));
        assert_eq!(parse_aqi(&json!("153")), Some(153));
        assert_eq!(parse_aqi(&json!("-")), None);
        assert_eq!(parse_aqi(&json!(-3)), None);
        assert_eq!(parse_aqi(&json!(12.5)), None);
        assert_eq!(parse_aqi(&Value::Null), None);
    }

    #[test]
    fn station_entries_from_list_and_map() {
        let list = json!([
            {"uid": 1, "lat": 10.0, "lon": 20.0, "aqi": "42"},
            "garbage",
            {"uid": 2, "lat": 11.0, "lon": 21.0, "aqi": 7}
        ]);
        assert_eq!(station_entries(list).len(), 2);

        let map = json!({
            "a": {"lat": 10.0, "lon": 20.0, "aqi": 1},
            "b": {"lat": 11.0, "lon": 21.0}
        });
        let entries = station_entries(map);
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.aqi.is_null()));

        assert!(station_entries(json!("Invalid key")).is_empty());
    }

    #[test]
    fn snapshot_from_feed_reads_city_and_geo() {
        let data = json!({
            "aqi": 64,
            "idx": 6384,
            "city": {"geo": [55.7558, 37.6173], "name": "Moscow"},
            "dominentpol": "pm25",
            "time": {"s": "2024-03-01 12:00:00", "iso": "2024-03-01T12:00:00+03:00"}
        });

        let snapshot = snapshot_from_feed(data).expect("feed should decode");
        assert_eq!(snapshot.station_name, "Moscow");
        assert_eq!(snapshot.aqi, Some(64));
        assert_eq!(snapshot.coordinates, Some(Coordinates::new(55.7558, 37.6173)));
        assert_eq!(snapshot.dominant_pollutant.as_deref(), Some("pm25"));
        assert_eq!(
            snapshot.observed_at.as_deref(),
            Some("2024-03-01T12:00:00+03:00")
        );
    }

    #[test]
    fn snapshot_without_geo_has_no_coordinates() {
        let snapshot = snapshot_from_feed(json!({"aqi": "-", "city": {"name": "X"}}))
            .expect("feed should decode");
        assert_eq!(snapshot.aqi, None);
        assert_eq!(snapshot.coordinates, None);
    }

    #[test]
    fn urls_encode_slug_and_token() {
        let base = Url::parse("https://api.waqi.info/").unwrap();

        assert_eq!(
            feed_url(&base, "moscow", "demo"),
            "https://api.waqi.info/feed/moscow/?token=demo"
        );
        assert_eq!(
            feed_url(&base, "a?b#c", "t&k=1"),
            "https://api.waqi.info/feed/a%3Fb%23c/?token=t%26k%3D1"
        );
        assert!(
            index_url(&base, "x#y")
                .starts_with("https://api.waqi.info/v2/map/bounds?latlng=")
        );
        assert!(index_url(&base, "x#y").ends_with("&networks=all&token=x%23y"));
    }

    #[test]
    fn envelope_message_for_errors() {
        let env: WaqiEnvelope =
            serde_json::from_value(json!({"status": "error", "data": "Invalid key"})).unwrap();
        assert!(!env.is_ok());
        assert_eq!(env.message(), "Invalid key");
        assert_eq!(env.check(), Err("Invalid key".to_string()));
    }
}
