//! Dirtiest and cleanest cities from the global station index.

use tracing::{info, warn};

use crate::{
    config::Config,
    error::AcquisitionError,
    fetch::{Fallback, FetchGateway},
    geocode::GeocodeResolver,
    model::{Coordinates, Station, TableData},
    provider::{
        ProviderId, parse_base,
        waqi::{self, RawStation, WaqiEnvelope},
    },
};

#[derive(Debug, Clone)]
pub struct TableDataAssembler {
    gateway: FetchGateway,
    resolver: GeocodeResolver,
    index_url: String,
    index_fallback: Option<Fallback>,
}

impl TableDataAssembler {
    pub fn new(
        gateway: FetchGateway,
        resolver: GeocodeResolver,
        index_url: String,
        index_fallback: Option<Fallback>,
    ) -> Self {
        Self {
            gateway,
            resolver,
            index_url,
            index_fallback,
        }
    }

    pub fn from_config(gateway: FetchGateway, config: &Config) -> Result<Self, AcquisitionError> {
        let token = config.provider_token(ProviderId::Waqi).unwrap_or_default();
        let base = parse_base(&config.endpoints.waqi)?;
        Ok(Self::new(
            gateway.clone(),
            GeocodeResolver::from_config(gateway, config)?,
            waqi::index_url(&base, token),
            config.index_fallback(),
        ))
    }

    pub async fn build_table_data(&self) -> TableData {
        let stations = self.load_stations().await;
        if stations.is_empty() {
            warn!("no valid stations available, table will be empty");
            return TableData::default();
        }

        info!(stations = stations.len(), "ranking stations");

        let dirty_cities = self.resolver.resolve_cities(stations.iter().rev()).await;
        let clean_cities = self.resolver.resolve_cities(stations.iter()).await;

        TableData {
            dirty_cities,
            clean_cities,
        }
    }

    /// Valid stations sorted ascending by index. A rejected envelope counts
    /// as a failed request, so the index fallback applies to it as well.
    async fn load_stations(&self) -> Vec<Station> {
        let Some(envelope) = self
            .gateway
            .fetch_validated(
                &self.index_url,
                self.index_fallback.as_ref(),
                WaqiEnvelope::check,
            )
            .await
        else {
            return Vec::new();
        };

        rank_stations(filter_stations(waqi::station_entries(envelope.data)))
    }
}

/// Drop entries without a usable index or position.
pub fn filter_stations(raw: Vec<RawStation>) -> Vec<Station> {
    raw.into_iter()
        .filter_map(|entry| {
            let aqi = waqi::parse_aqi(&entry.aqi)?;
            let at = Coordinates::new(entry.lat?, entry.lon?);
            at.is_valid().then_some(Station {
                uid: entry.uid,
                latitude: at.latitude,
                longitude: at.longitude,
                aqi,
            })
        })
        .collect()
}

/// Stable ascending sort by index.
pub fn rank_stations(mut stations: Vec<Station>) -> Vec<Station> {
    stations.sort_by_key(|s| s.aqi);
    stations
}
