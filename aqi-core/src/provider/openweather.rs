//! OpenWeather air pollution history payloads.

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Deserialize;

use super::with_path;
use crate::model::{Components, Coordinates, HistoryPoint};

#[derive(Debug, Deserialize)]
pub struct OwHistoryResponse {
    #[serde(default)]
    pub list: Vec<OwHistoryEntry>,
}

#[derive(Debug, Deserialize)]
pub struct OwHistoryEntry {
    pub dt: i64,
    pub main: OwMain,
    #[serde(default)]
    pub components: Components,
}

#[derive(Debug, Deserialize)]
pub struct OwMain {
    pub aqi: u8,
}

/// `start` and `end` are Unix timestamps in seconds.
pub fn history_url(base: &Url, at: Coordinates, start: i64, end: i64, token: &str) -> String {
    let mut url = with_path(base, &["data", "2.5", "air_pollution", "history"]);
    url.query_pairs_mut()
        .append_pair("lat", &at.latitude.to_string())
        .append_pair("lon", &at.longitude.to_string())
        .append_pair("start", &start.to_string())
        .append_pair("end", &end.to_string())
        .append_pair("appid", token);
    url.into()
}

impl OwHistoryResponse {
    /// Convert to history points ordered by time. Entries with an
    /// unrepresentable timestamp are dropped.
    pub fn into_points(self) -> Vec<HistoryPoint> {
        let mut points: Vec<HistoryPoint> = self
            .list
            .into_iter()
            .filter_map(|entry| {
                let timestamp = DateTime::<Utc>::from_timestamp(entry.dt, 0)?;
                Some(HistoryPoint {
                    timestamp,
                    aqi: entry.main.aqi,
                    components: entry.components,
                })
            })
            .collect();

        points.sort_by_key(|p| p.timestamp);
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_url_uses_seconds() {
        let base = Url::parse("https://api.openweathermap.org").unwrap();
        let url = history_url(
            &base,
            Coordinates::new(50.0, 30.5),
            1_700_000_000,
            1_700_259_200,
            "KEY",
        );
        assert_eq!(
            url,
            "https://api.openweathermap.org/data/2.5/air_pollution/history?lat=50&lon=30.5&start=1700000000&end=1700259200&appid=KEY"
        );
    }

    #[test]
    fn into_points_sorts_by_time() {
        let resp: OwHistoryResponse = serde_json::from_str(
            r#"{"coord":{"lon":30.5,"lat":50},"list":[
                {"dt":1700003600,"main":{"aqi":3},"components":{"co":300.4,"pm2_5":12.1}},
                {"dt":1700000000,"main":{"aqi":2},"components":{"co":250.3,"pm2_5":8.0}}
            ]}"#,
        )
        .unwrap();

        let points = resp.into_points();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].timestamp.timestamp(), 1_700_000_000);
        assert_eq!(points[0].aqi, 2);
        assert_eq!(points[1].components.pm2_5, 12.1);
        assert_eq!(points[1].components.nh3, 0.0);
    }
}
