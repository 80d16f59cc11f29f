//! Test utilities for cloudwatch-check tests
//!
//! [`ScriptedProvider`] is an in-memory [`MetricsProvider`] whose listing
//! pages, datapoints, diagnostics and failures are set up front. It records
//! every request it receives so tests can assert on them.

use crate::datamodel::{DataQuery, DataResult, Datapoint, MetricSeries, ProviderMessage};
use crate::provider::{FetchResponse, ListSeriesRequest, MetricsProvider, SeriesPage, TimeWindow};
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Identifier returned for a result that matches no query.
pub const UNKNOWN_RESULT_ID: &str = "aws_unknown";

#[derive(Debug, Default)]
pub struct ScriptedProvider {
    pages: Vec<Vec<MetricSeries>>,
    datapoints: HashMap<String, Vec<Datapoint>>,
    result_messages: HashMap<String, Vec<ProviderMessage>>,
    response_messages: Vec<ProviderMessage>,
    fetch_token: Option<String>,
    list_failure: Option<String>,
    fetch_failure: Option<String>,
    unknown_result: bool,
    list_requests: Mutex<Vec<ListSeriesRequest>>,
    fetch_windows: Mutex<Vec<TimeWindow>>,
    batch_sizes: Mutex<Vec<usize>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one listing page. Pages are served in order, linked by `page-N` tokens.
    pub fn with_page(mut self, series: Vec<MetricSeries>) -> Self {
        self.pages.push(series);
        self
    }

    /// Datapoints returned for every query carrying this label.
    pub fn with_datapoints(mut self, label: &str, datapoints: Vec<Datapoint>) -> Self {
        self.datapoints.insert(label.to_string(), datapoints);
        self
    }

    pub fn with_result_message(mut self, label: &str, message: ProviderMessage) -> Self {
        self.result_messages
            .entry(label.to_string())
            .or_default()
            .push(message);
        self
    }

    pub fn with_response_message(mut self, message: ProviderMessage) -> Self {
        self.response_messages.push(message);
        self
    }

    pub fn with_fetch_token(mut self, token: &str) -> Self {
        self.fetch_token = Some(token.to_string());
        self
    }

    pub fn with_list_failure(mut self, message: &str) -> Self {
        self.list_failure = Some(message.to_string());
        self
    }

    pub fn with_fetch_failure(mut self, message: &str) -> Self {
        self.fetch_failure = Some(message.to_string());
        self
    }

    pub fn with_unknown_result(mut self) -> Self {
        self.unknown_result = true;
        self
    }

    pub fn list_requests(&self) -> Vec<ListSeriesRequest> {
        self.list_requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn fetch_windows(&self) -> Vec<TimeWindow> {
        self.fetch_windows
            .lock()
            .map(|windows| windows.clone())
            .unwrap_or_default()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes
            .lock()
            .map(|sizes| sizes.clone())
            .unwrap_or_default()
    }

    pub fn fetch_count(&self) -> usize {
        self.batch_sizes().len()
    }
}

fn page_index(token: Option<&str>) -> Result<usize> {
    match token {
        None => Ok(0),
        Some(token) => token
            .strip_prefix("page-")
            .and_then(|index| index.parse().ok())
            .ok_or_else(|| anyhow!("Unknown continuation token {}", token)),
    }
}

#[async_trait]
impl MetricsProvider for ScriptedProvider {
    async fn list_series(&self, request: &ListSeriesRequest) -> Result<SeriesPage> {
        self.list_requests
            .lock()
            .map_err(|_| anyhow!("request log poisoned"))?
            .push(request.clone());
        if let Some(message) = &self.list_failure {
            bail!("ListMetrics: {}", message);
        }

        let index = page_index(request.next_token.as_deref())?;
        let series = self.pages.get(index).cloned().unwrap_or_default();
        let next_token = (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1));
        Ok(SeriesPage { series, next_token })
    }

    async fn fetch_datapoints(
        &self,
        queries: &[DataQuery],
        window: &TimeWindow,
    ) -> Result<FetchResponse> {
        self.fetch_windows
            .lock()
            .map_err(|_| anyhow!("request log poisoned"))?
            .push(*window);
        self.batch_sizes
            .lock()
            .map_err(|_| anyhow!("request log poisoned"))?
            .push(queries.len());
        if let Some(message) = &self.fetch_failure {
            bail!("GetMetricData: {}", message);
        }

        let mut results: Vec<DataResult> = queries
            .iter()
            .map(|query| DataResult {
                id: query.id.clone(),
                datapoints: self.datapoints.get(&query.label).cloned().unwrap_or_default(),
                messages: self
                    .result_messages
                    .get(&query.label)
                    .cloned()
                    .unwrap_or_default(),
            })
            .collect();
        if self.unknown_result {
            results.push(DataResult::new(UNKNOWN_RESULT_ID, vec![Datapoint::new(0, 0.0)]));
        }

        Ok(FetchResponse {
            results,
            next_token: self.fetch_token.clone(),
            messages: self.response_messages.clone(),
        })
    }
}
