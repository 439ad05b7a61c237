use serde::Serialize;

use crate::{
    config::Config,
    error::AcquisitionError,
    fetch::FetchGateway,
    history::HistoryAssembler,
    location::LocationContext,
    model::{ChartData, TableData},
    table::TableDataAssembler,
};

/// Everything the presentation layer needs for one refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardData {
    pub table: TableData,
    pub chart: ChartData,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    table: TableDataAssembler,
    history: HistoryAssembler,
}

impl Dashboard {
    /// Fails only when a configured endpoint base URL is unusable.
    pub fn from_config(gateway: FetchGateway, config: &Config) -> Result<Self, AcquisitionError> {
        Ok(Self {
            table: TableDataAssembler::from_config(gateway.clone(), config)?,
            history: HistoryAssembler::from_config(gateway, config)?,
        })
    }

    pub fn table(&self) -> &TableDataAssembler {
        &self.table
    }

    pub fn history(&self) -> &HistoryAssembler {
        &self.history
    }

    /// Build table and chart data one after the other.
    pub async fn load(&self, ctx: &LocationContext) -> DashboardData {
        let table = self.table.build_table_data().await;
        let chart = self.history.build_chart_data(ctx).await;
        DashboardData { table, chart }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fetch::DEFAULT_TIMEOUT, testing::StubTransport};
    use std::sync::Arc;

    #[tokio::test]
    async fn offline_dashboard_still_has_bundled_history() {
        let stub = Arc::new(StubTransport::new().fail("://", "network unreachable"));
        let dashboard =
            Dashboard::from_config(FetchGateway::new(stub.clone(), DEFAULT_TIMEOUT), &Config::default())
                .unwrap();

        let data = dashboard.load(&LocationContext::new()).await;

        assert!(data.table.dirty_cities.is_empty());
        assert!(data.table.clean_cities.is_empty());
        assert_eq!(data.chart.info_now, None);
        assert!(!data.chart.chart_data.is_empty());
        // index, snapshot and history, no geocoding
        assert_eq!(stub.calls().len(), 3);
    }
}
