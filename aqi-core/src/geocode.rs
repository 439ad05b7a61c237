//! Reverse geocoding of stations into ranked city lists.

use reqwest::Url;
use tracing::{debug, warn};

use crate::{
    config::Config,
    error::AcquisitionError,
    fetch::FetchGateway,
    model::{City, RankedCityList, Station},
    provider::{
        ProviderId, parse_base,
        mapbox::{self, MbResponse, PLACE_NAME_DEPTH},
    },
};

#[derive(Debug, Clone)]
pub struct GeocodeResolver {
    gateway: FetchGateway,
    base_url: Url,
    token: Option<String>,
}

impl GeocodeResolver {
    pub fn new(gateway: FetchGateway, base_url: Url, token: Option<String>) -> Self {
        Self {
            gateway,
            base_url,
            token,
        }
    }

    pub fn from_config(gateway: FetchGateway, config: &Config) -> Result<Self, AcquisitionError> {
        Ok(Self::new(
            gateway,
            parse_base(&config.endpoints.mapbox)?,
            config.provider_token(ProviderId::Mapbox).map(str::to_owned),
        ))
    }

    /// Look up the display name for one station.
    pub async fn resolve_city(&self, lat: f64, lon: f64, aqi: u32) -> Result<City, AcquisitionError> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| AcquisitionError::geocode(lat, lon, "no mapbox token configured"))?;

        let url = mapbox::reverse_url(&self.base_url, lat, lon, token);
        let response = self
            .gateway
            .fetch_as::<MbResponse>(&url, None)
            .await
            .ok_or_else(|| AcquisitionError::geocode(lat, lon, "no geocoding data"))?;

        let name = response.place_name(PLACE_NAME_DEPTH).ok_or_else(|| {
            AcquisitionError::geocode(
                lat,
                lon,
                format!(
                    "place hierarchy has {} levels, need {}",
                    response.features.len(),
                    PLACE_NAME_DEPTH + 1
                ),
            )
        })?;

        Ok(City {
            name: name.to_string(),
            aqi,
        })
    }

    /// Resolve stations in order until [`RankedCityList::CAPACITY`] unique
    /// cities are collected or the input runs out.
    ///
    /// Lookups run strictly one after another so that at most one request is
    /// outstanding against the geocoding provider, whose free tier rate-limits
    /// aggressively. Stations that fail to resolve are skipped.
    pub async fn resolve_cities<'a, I>(&self, stations: I) -> RankedCityList
    where
        I: IntoIterator<Item = &'a Station>,
    {
        let mut cities = RankedCityList::new();

        if self.token.is_none() {
            warn!("no mapbox token configured, skipping city resolution");
            return cities;
        }

        for station in stations {
            match self
                .resolve_city(station.latitude, station.longitude, station.aqi)
                .await
            {
                Ok(city) => {
                    if !cities.try_push(city) {
                        debug!(uid = ?station.uid, "duplicate city skipped");
                    }
                }
                Err(err) => warn!(uid = ?station.uid, error = %err, "station skipped"),
            }

            if cities.is_full() {
                break;
            }
        }

        cities
    }
}
