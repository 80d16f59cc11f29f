use crate::datamodel::{DataQuery, DataResult, DimensionFilter, MetricSeries, ProviderMessage};
use anyhow::Result;
use async_trait::async_trait;
use hifitime::{Epoch, Unit};
use std::fmt::Debug;

#[cfg(feature = "cloudwatch")]
pub mod cloudwatch;
pub mod provider_factory;

pub use provider_factory::create_provider;

/// Look-back hint sent with the listing when only recently active series are wanted.
pub const RECENTLY_ACTIVE_WINDOW: &str = "PT3H";

/// Narrowing of one series listing request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListSeriesRequest {
    pub namespace: Option<String>,
    pub metric_name: Option<String>,
    pub dimension_filters: Vec<DimensionFilter>,
    pub recently_active: bool,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SeriesPage {
    pub series: Vec<MetricSeries>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FetchResponse {
    pub results: Vec<DataResult>,
    pub next_token: Option<String>,
    pub messages: Vec<ProviderMessage>,
}

/// Time range the statistics are computed over, in whole unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start_unix_seconds: i64,
    pub end_unix_seconds: i64,
}

impl TimeWindow {
    pub fn ending_at(end: Epoch, minutes: u32) -> Self {
        let end_unix_seconds = end.to_unix_seconds().floor() as i64;
        let lookback = Unit::Minute * i64::from(minutes);
        Self {
            start_unix_seconds: end_unix_seconds - lookback.to_seconds() as i64,
            end_unix_seconds,
        }
    }

    pub fn ending_now(minutes: u32) -> Result<Self> {
        let now = Epoch::now().map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?;
        Ok(Self::ending_at(now, minutes))
    }
}

/// A metrics backend able to list series and fetch statistics for them.
#[async_trait]
pub trait MetricsProvider: Send + Sync + Debug {
    async fn list_series(&self, request: &ListSeriesRequest) -> Result<SeriesPage>;

    async fn fetch_datapoints(
        &self,
        queries: &[DataQuery],
        window: &TimeWindow,
    ) -> Result<FetchResponse>;
}
