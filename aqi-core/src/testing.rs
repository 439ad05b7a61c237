//! In-memory transport for unit tests.

use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::{
    error::AcquisitionError,
    fetch::{RawResponse, Transport},
    model::Station,
};

#[derive(Debug, Clone)]
enum Route {
    Respond(StatusCode, String),
    Slow(Duration, String),
    Hang,
    Fail(String),
}

/// Routes each URL to the first registered pattern it contains and records
/// every request in order. Unmatched URLs get a 404.
#[derive(Debug, Default)]
pub(crate) struct StubTransport {
    routes: Vec<(String, Route)>,
    calls: Mutex<Vec<String>>,
}

impl StubTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn route(mut self, pattern: &str, route: Route) -> Self {
        self.routes.push((pattern.to_string(), route));
        self
    }

    pub(crate) fn ok(self, pattern: &str, body: &str) -> Self {
        self.route(pattern, Route::Respond(StatusCode::OK, body.to_string()))
    }

    pub(crate) fn status(self, pattern: &str, status: StatusCode, body: &str) -> Self {
        self.route(pattern, Route::Respond(status, body.to_string()))
    }

    pub(crate) fn slow(self, pattern: &str, delay: Duration, body: &str) -> Self {
        self.route(pattern, Route::Slow(delay, body.to_string()))
    }

    pub(crate) fn hang(self, pattern: &str) -> Self {
        self.route(pattern, Route::Hang)
    }

    pub(crate) fn fail(self, pattern: &str, reason: &str) -> Self {
        self.route(pattern, Route::Fail(reason.to_string()))
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_matching(&self, pattern: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|url| url.contains(pattern))
            .collect()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, AcquisitionError> {
        self.calls.lock().unwrap().push(url.to_string());

        let route = self
            .routes
            .iter()
            .find(|(pattern, _)| url.contains(pattern.as_str()))
            .map(|(_, route)| route.clone());

        match route {
            Some(Route::Respond(status, body)) => Ok(RawResponse { status, body }),
            Some(Route::Slow(delay, body)) => {
                tokio::time::sleep(delay).await;
                Ok(RawResponse {
                    status: StatusCode::OK,
                    body,
                })
            }
            Some(Route::Hang) => std::future::pending().await,
            Some(Route::Fail(reason)) => Err(AcquisitionError::Transport {
                url: url.to_string(),
                reason,
            }),
            None => Ok(RawResponse {
                status: StatusCode::NOT_FOUND,
                body: "no route".to_string(),
            }),
        }
    }
}

/// Station `i` sits at `(i, 100 + i)` so each one has a distinct lookup URL.
pub(crate) fn station(i: u32, aqi: u32) -> Station {
    Station {
        uid: Some(i64::from(i)),
        latitude: f64::from(i),
        longitude: 100.0 + f64::from(i),
        aqi,
    }
}

/// Route pattern matching the reverse geocoding request for `station(i, _)`.
pub(crate) fn lookup_for(i: u32) -> String {
    format!("/{},{}.json", 100 + i, i)
}

/// Mapbox-shaped body whose third feature is `name`.
pub(crate) fn places(name: &str) -> String {
    format!(
        r#"{{"features":[
            {{"place_name":"Street, {name}"}},
            {{"place_name":"District, {name}"}},
            {{"place_name":"{name}"}},
            {{"place_name":"Country"}}
        ]}}"#
    )
}
