//! User location: a single-shot lookup stored in an explicit context.

use std::{fmt::Debug, sync::OnceLock};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::{
    error::AcquisitionError, fetch::FetchGateway, model::Coordinates,
    provider::ipapi::IpApiResponse,
};

/// Source of the device position.
#[async_trait]
pub trait GeolocationCapability: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates, AcquisitionError>;
}

/// Holds the user location once it is known. Written at most once per
/// session and read-only afterwards.
#[derive(Debug, Default)]
pub struct LocationContext {
    user_location: OnceLock<Coordinates>,
}

impl LocationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_location(&self) -> Option<Coordinates> {
        self.user_location.get().copied()
    }

    fn store(&self, at: Coordinates) -> bool {
        self.user_location.set(at).is_ok()
    }
}

#[derive(Debug, Default)]
pub struct LocationService {
    capability: Option<Box<dyn GeolocationCapability>>,
}

impl LocationService {
    pub fn new(capability: Option<Box<dyn GeolocationCapability>>) -> Self {
        Self { capability }
    }

    /// Ask the capability for the current position and store it in `ctx`.
    ///
    /// Failures are logged and leave `ctx` untouched. Once `ctx` holds a
    /// location the capability is not queried again.
    pub async fn resolve_user_location(&self, ctx: &LocationContext) {
        if ctx.user_location().is_some() {
            debug!("user location already resolved");
            return;
        }

        let Some(capability) = &self.capability else {
            warn!("geolocation is not available, continuing without user location");
            return;
        };

        match capability.current_position().await {
            Ok(at) if at.is_valid() => {
                if ctx.store(at) {
                    info!(lat = at.latitude, lon = at.longitude, "user location resolved");
                }
            }
            Ok(at) => {
                warn!(lat = at.latitude, lon = at.longitude, "geolocation returned invalid coordinates");
            }
            Err(err) => warn!(error = %err, "geolocation failed"),
        }
    }
}

/// Position supplied up front, e.g. from the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

#[async_trait]
impl GeolocationCapability for FixedPosition {
    async fn current_position(&self) -> Result<Coordinates, AcquisitionError> {
        Ok(self.0)
    }
}

/// Approximate position derived from the public IP address.
#[derive(Debug, Clone)]
pub struct IpGeolocation {
    gateway: FetchGateway,
    url: String,
}

impl IpGeolocation {
    pub fn new(gateway: FetchGateway, url: impl Into<String>) -> Self {
        Self {
            gateway,
            url: url.into(),
        }
    }
}

#[async_trait]
impl GeolocationCapability for IpGeolocation {
    async fn current_position(&self) -> Result<Coordinates, AcquisitionError> {
        self.gateway
            .fetch_as::<IpApiResponse>(&self.url, None)
            .await
            .ok_or_else(|| AcquisitionError::geolocation("IP lookup returned no data"))?
            .into_coordinates()
    }
}
