use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use crate::{fetch::Fallback, model::Coordinates, provider::ProviderId};

const DEFAULT_HISTORY_WINDOW_HOURS: i64 = 72;
/// Five years; the history API keeps far less than that.
const MAX_HISTORY_WINDOW_HOURS: i64 = 5 * 365 * 24;

/// Credentials for a single provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub token: String,
}

/// Base URLs of the remote providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub waqi: String,
    pub mapbox: String,
    pub openweather: String,
    pub ip_geolocation: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            waqi: "https://api.waqi.info".to_string(),
            mapbox: "https://api.mapbox.com".to_string(),
            openweather: "https://api.openweathermap.org".to_string(),
            ip_geolocation: "http://ip-api.com/json/".to_string(),
        }
    }
}

/// City whose current reading feeds the chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceCity {
    /// WAQI feed slug, e.g. "moscow".
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl ReferenceCity {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

impl Default for ReferenceCity {
    fn default() -> Self {
        Self {
            name: "moscow".to_string(),
            latitude: 55.7558,
            longitude: 37.6173,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub timeout_secs: u64,
    pub history_window_hours: i64,

    /// Fallback for the station index: an http(s) URL or a local file path.
    pub index_fallback: Option<String>,
    pub snapshot_fallback: Option<String>,
    /// Falls back to the bundled history document when unset.
    pub history_fallback: Option<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 3,
            history_window_hours: DEFAULT_HISTORY_WINDOW_HOURS,
            index_fallback: None,
            snapshot_fallback: None,
            history_fallback: None,
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Example TOML:
    /// [providers.mapbox]
    /// token = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default)]
    pub endpoints: Endpoints,

    #[serde(default)]
    pub reference_city: ReferenceCity,

    #[serde(default)]
    pub fetch: FetchSettings,
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "air-dashboard", "aqi")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set or replace the token of a provider.
    pub fn upsert_provider_token(&mut self, provider_id: ProviderId, token: String) {
        self.providers
            .insert(provider_id.as_str().to_string(), ProviderConfig { token });
    }

    /// Configured token, or the provider's public default if it has one.
    pub fn provider_token(&self, provider_id: ProviderId) -> Option<&str> {
        self.providers
            .get(provider_id.as_str())
            .map(|cfg| cfg.token.as_str())
            .filter(|token| !token.is_empty())
            .or_else(|| provider_id.default_token())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_token(provider_id).is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_secs)
    }

    /// Lookback window for the history request. Values outside
    /// `1..=MAX_HISTORY_WINDOW_HOURS` fall back to the 72 h default.
    pub fn history_window(&self) -> chrono::TimeDelta {
        let hours = self.fetch.history_window_hours;
        match chrono::TimeDelta::try_hours(hours) {
            Some(window) if (1..=MAX_HISTORY_WINDOW_HOURS).contains(&hours) => window,
            _ => {
                tracing::warn!(
                    hours,
                    default = DEFAULT_HISTORY_WINDOW_HOURS,
                    "history_window_hours out of range, using default"
                );
                chrono::TimeDelta::hours(DEFAULT_HISTORY_WINDOW_HOURS)
            }
        }
    }

    pub fn index_fallback(&self) -> Option<Fallback> {
        self.fetch.index_fallback.as_deref().map(Fallback::parse)
    }

    pub fn snapshot_fallback(&self) -> Option<Fallback> {
        self.fetch.snapshot_fallback.as_deref().map(Fallback::parse)
    }

    pub fn history_fallback(&self) -> Fallback {
        self.fetch
            .history_fallback
            .as_deref()
            .map(Fallback::parse)
            .unwrap_or_else(Fallback::bundled_history)
    }
}
