//! HTTP access with a bounded primary attempt and a single fallback.

use std::{fmt::Debug, path::PathBuf, sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::{AcquisitionError, display_url, truncate_body};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

const BUNDLED_HISTORY: &str = include_str!("../assets/api-history.json");

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Issues a single GET and hands back status and body untouched.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn get(&self, url: &str) -> Result<RawResponse, AcquisitionError>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, AcquisitionError> {
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AcquisitionError::Transport {
                url: display_url(url),
                reason: e.to_string(),
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| AcquisitionError::Transport {
            url: display_url(url),
            reason: format!("failed to read body: {e}"),
        })?;

        Ok(RawResponse { status, body })
    }
}

/// Secondary origin used when the primary request fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    /// Remote mirror, requested without a timeout.
    Url(String),
    /// JSON document on the local filesystem.
    File(PathBuf),
    /// JSON document compiled into the binary.
    Bundled {
        name: &'static str,
        body: &'static str,
    },
}

impl Fallback {
    /// `http://` and `https://` values are URLs, anything else a file path.
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            Fallback::Url(value.to_string())
        } else {
            Fallback::File(PathBuf::from(value))
        }
    }

    pub fn bundled_history() -> Self {
        Fallback::Bundled {
            name: "api-history.json",
            body: BUNDLED_HISTORY,
        }
    }

    fn describe(&self) -> String {
        match self {
            Fallback::Url(url) => display_url(url),
            Fallback::File(path) => path.display().to_string(),
            Fallback::Bundled { name, .. } => format!("bundled:{name}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchGateway {
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl FetchGateway {
    pub fn new(transport: Arc<dyn Transport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    pub fn with_reqwest(timeout: Duration) -> Self {
        Self::new(Arc::new(ReqwestTransport::new()), timeout)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch a JSON document. `None` means neither source produced data; an
    /// empty but valid payload is still `Some`.
    pub async fn fetch(&self, primary: &str, fallback: Option<&Fallback>) -> Option<Value> {
        self.fetch_as::<Value>(primary, fallback).await
    }

    /// Like [`fetch`](Self::fetch) but decodes into `T`. A body that doesn't
    /// match `T` counts as a parse failure and triggers the fallback.
    pub async fn fetch_as<T: DeserializeOwned>(
        &self,
        primary: &str,
        fallback: Option<&Fallback>,
    ) -> Option<T> {
        self.fetch_validated(primary, fallback, |_: &T| Ok(())).await
    }

    /// Like [`fetch_as`](Self::fetch_as), but a decoded body that `validate`
    /// rejects (a provider error inside a 2xx response) also triggers the
    /// fallback. The fallback document is held to the same check.
    pub async fn fetch_validated<T, F>(
        &self,
        primary: &str,
        fallback: Option<&Fallback>,
        validate: F,
    ) -> Option<T>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> Result<(), String>,
    {
        let err = match self
            .fetch_primary::<T>(primary)
            .await
            .and_then(|value| accept(&display_url(primary), value, &validate))
        {
            Ok(value) => return Some(value),
            Err(err) => err,
        };

        let Some(fallback) = fallback else {
            error!(url = %display_url(primary), error = %err, "request failed and no fallback is configured");
            return None;
        };

        warn!(
            url = %display_url(primary),
            fallback = %fallback.describe(),
            error = %err,
            "primary request failed, using fallback"
        );

        match self
            .fetch_fallback::<T>(fallback)
            .await
            .and_then(|value| accept(&fallback.describe(), value, &validate))
        {
            Ok(value) => {
                info!(fallback = %fallback.describe(), "served from fallback");
                Some(value)
            }
            Err(err) => {
                error!(fallback = %fallback.describe(), error = %err, "fallback failed, no data");
                None
            }
        }
    }

    async fn fetch_primary<T: DeserializeOwned>(&self, url: &str) -> Result<T, AcquisitionError> {
        debug!(url = %display_url(url), timeout = ?self.timeout, "GET");

        // Dropping the future on timeout cancels the in-flight request.
        let response = tokio::time::timeout(self.timeout, self.transport.get(url))
            .await
            .map_err(|_| AcquisitionError::Timeout {
                url: display_url(url),
                timeout: self.timeout,
            })??;

        decode(url, response)
    }

    async fn fetch_fallback<T: DeserializeOwned>(
        &self,
        fallback: &Fallback,
    ) -> Result<T, AcquisitionError> {
        match fallback {
            Fallback::Url(url) => {
                debug!(url = %display_url(url), "GET fallback");
                let response = self.transport.get(url).await?;
                decode(url, response)
            }
            Fallback::File(path) => {
                let body = tokio::fs::read_to_string(path).await.map_err(|source| {
                    AcquisitionError::FallbackIo {
                        path: path.display().to_string(),
                        source,
                    }
                })?;
                parse_body(&path.display().to_string(), &body)
            }
            Fallback::Bundled { name, body } => parse_body(name, body),
        }
    }
}

fn accept<T, F>(origin: &str, value: T, validate: &F) -> Result<T, AcquisitionError>
where
    F: Fn(&T) -> Result<(), String>,
{
    validate(&value).map_err(|message| AcquisitionError::Rejected {
        origin: origin.to_string(),
        message,
    })?;
    Ok(value)
}

fn decode<T: DeserializeOwned>(url: &str, response: RawResponse) -> Result<T, AcquisitionError> {
    if !response.status.is_success() {
        return Err(AcquisitionError::HttpError {
            url: display_url(url),
            status: response.status,
            body: truncate_body(&response.body),
        });
    }

    parse_body(&display_url(url), &response.body)
}

fn parse_body<T: DeserializeOwned>(origin: &str, body: &str) -> Result<T, AcquisitionError> {
    serde_json::from_str(body).map_err(|source| AcquisitionError::ParseError {
        origin: origin.to_string(),
        source,
    })
}
