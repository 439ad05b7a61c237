//! ip-api.com geolocation payloads.

use serde::Deserialize;

use crate::{error::AcquisitionError, model::Coordinates};

#[derive(Debug, Deserialize)]
pub struct IpApiResponse {
    pub status: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub message: Option<String>,
}

impl IpApiResponse {
    pub fn into_coordinates(self) -> Result<Coordinates, AcquisitionError> {
        if self.status != "success" {
            return Err(AcquisitionError::geolocation(
                self.message
                    .unwrap_or_else(|| format!("lookup status '{}'", self.status)),
            ));
        }

        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(AcquisitionError::geolocation("response carried no coordinates")),
        }
    }
}
