//! Current reading and recent pollution history for the chart.

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Url;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::AcquisitionError,
    fetch::{Fallback, FetchGateway},
    location::LocationContext,
    model::{ChartData, Coordinates, HistoryPoint, Snapshot},
    provider::{
        ProviderId,
        openweather::{self, OwHistoryResponse},
        parse_base,
        waqi::{self, WaqiEnvelope},
    },
};

#[derive(Debug, Clone)]
pub struct HistoryAssembler {
    gateway: FetchGateway,
    snapshot_url: String,
    snapshot_fallback: Option<Fallback>,
    history_base: Url,
    history_token: String,
    history_fallback: Fallback,
    reference: Coordinates,
    window: TimeDelta,
}

impl HistoryAssembler {
    pub fn from_config(gateway: FetchGateway, config: &Config) -> Result<Self, AcquisitionError> {
        let waqi_token = config.provider_token(ProviderId::Waqi).unwrap_or_default();
        Ok(Self {
            gateway,
            snapshot_url: waqi::feed_url(
                &parse_base(&config.endpoints.waqi)?,
                &config.reference_city.name,
                waqi_token,
            ),
            snapshot_fallback: config.snapshot_fallback(),
            history_base: parse_base(&config.endpoints.openweather)?,
            history_token: config
                .provider_token(ProviderId::OpenWeather)
                .unwrap_or_default()
                .to_string(),
            history_fallback: config.history_fallback(),
            reference: config.reference_city.coordinates(),
            window: config.history_window(),
        })
    }

    pub async fn build_chart_data(&self, ctx: &LocationContext) -> ChartData {
        self.build_chart_data_at(ctx, Utc::now()).await
    }

    pub async fn build_chart_data_at(&self, ctx: &LocationContext, now: DateTime<Utc>) -> ChartData {
        let info_now = self.load_snapshot().await;

        let at = ctx
            .user_location()
            .or_else(|| info_now.as_ref().and_then(|s| s.coordinates))
            .unwrap_or(self.reference);

        let chart_data = self.load_history(at, now).await;

        ChartData {
            chart_data,
            info_now,
        }
    }

    /// Lookback window ending at `now`, as Unix seconds. The start saturates
    /// at the earliest representable instant.
    pub fn history_window(&self, now: DateTime<Utc>) -> (i64, i64) {
        let start = now
            .checked_sub_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        (start.timestamp(), now.timestamp())
    }

    async fn load_snapshot(&self) -> Option<Snapshot> {
        let envelope = self
            .gateway
            .fetch_validated(
                &self.snapshot_url,
                self.snapshot_fallback.as_ref(),
                WaqiEnvelope::check,
            )
            .await?;

        match waqi::snapshot_from_feed(envelope.data) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(error = %err, "snapshot payload has an unexpected shape");
                None
            }
        }
    }

    async fn load_history(&self, at: Coordinates, now: DateTime<Utc>) -> Vec<HistoryPoint> {
        let (start, end) = self.history_window(now);
        debug!(lat = at.latitude, lon = at.longitude, start, end, "loading history");

        let url = openweather::history_url(&self.history_base, at, start, end, &self.history_token);
        let points = self
            .gateway
            .fetch_as::<OwHistoryResponse>(&url, Some(&self.history_fallback))
            .await
            .map(OwHistoryResponse::into_points)
            .unwrap_or_default();

        info!(points = points.len(), "history loaded");
        points
    }
}
