//! Core library for the `aqi` air quality dashboard.
//!
//! This crate defines:
//! - Configuration & provider tokens
//! - A fetch gateway with timeouts and local fallbacks
//! - Station ranking, reverse geocoding and pollution history assembly
//!
//! Every failure is recovered inside this crate: callers receive fallback
//! data or empty collections, never an error.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod geocode;
pub mod history;
pub mod location;
pub mod model;
pub mod provider;
pub mod table;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Config, ProviderConfig};
pub use dashboard::{Dashboard, DashboardData};
pub use error::AcquisitionError;
pub use fetch::{Fallback, FetchGateway};
pub use location::{LocationContext, LocationService};
pub use model::{ChartData, City, Coordinates, HistoryPoint, RankedCityList, Snapshot, TableData};
pub use provider::ProviderId;
