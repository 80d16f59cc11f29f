use super::{
    FetchResponse, ListSeriesRequest, MetricsProvider, RECENTLY_ACTIVE_WINDOW, SeriesPage,
    TimeWindow,
};
use crate::datamodel::{
    DataQuery, DataResult, Datapoint, DimensionFilter, MetricSeries, ProviderMessage,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudwatch::Client;
use aws_sdk_cloudwatch::error::DisplayErrorContext;
use aws_sdk_cloudwatch::operation::get_metric_data::GetMetricDataOutput;
use aws_sdk_cloudwatch::operation::get_metric_data::builders::GetMetricDataInputBuilder;
use aws_sdk_cloudwatch::operation::list_metrics::ListMetricsOutput;
use aws_sdk_cloudwatch::operation::list_metrics::builders::ListMetricsInputBuilder;
use aws_sdk_cloudwatch::primitives::DateTime;
use aws_sdk_cloudwatch::types::{
    Dimension as CwDimension, DimensionFilter as CwDimensionFilter, MessageData, Metric,
    MetricDataQuery, MetricDataResult, MetricStat, RecentlyActive,
};
use tracing::debug;

/// CloudWatch backed provider using `ListMetrics` and `GetMetricData`.
///
/// Credentials come from the SDK default chain.
#[derive(Debug, Clone)]
pub struct CloudWatchProvider {
    client: Client,
}

impl CloudWatchProvider {
    pub async fn connect(region: Option<&str>, profile: Option<&str>) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let sdk_config = loader.load().await;
        if sdk_config.region().is_none() {
            anyhow::bail!("No AWS region configured: use --region or AWS_REGION");
        }
        debug!("CloudWatch client for region {:?}", sdk_config.region());

        Ok(Self {
            client: Client::new(&sdk_config),
        })
    }
}

fn to_cloudwatch_filter(filter: &DimensionFilter) -> CwDimensionFilter {
    CwDimensionFilter::builder()
        .name(filter.name.clone())
        .set_value(filter.value.clone())
        .build()
}

fn from_cloudwatch_metric(metric: &Metric) -> MetricSeries {
    let mut series = MetricSeries::new(
        metric.namespace().unwrap_or_default(),
        metric.metric_name().unwrap_or_default(),
    );
    for dimension in metric.dimensions() {
        series = series.with_dimension(
            dimension.name().unwrap_or_default(),
            dimension.value().unwrap_or_default(),
        );
    }
    series
}

fn to_cloudwatch_query(query: &DataQuery) -> Result<MetricDataQuery> {
    let dimensions = query
        .series
        .dimensions
        .iter()
        .map(|d| CwDimension::builder().name(&d.name).value(&d.value).build())
        .collect::<Vec<_>>();
    let metric = Metric::builder()
        .namespace(&query.series.namespace)
        .metric_name(&query.series.metric_name)
        .set_dimensions(Some(dimensions))
        .build();
    let period = i32::try_from(query.period_seconds).context("Period does not fit the API")?;
    let metric_stat = MetricStat::builder()
        .metric(metric)
        .period(period)
        .stat(&query.stat)
        .build();

    Ok(MetricDataQuery::builder()
        .id(&query.id)
        .label(&query.label)
        .metric_stat(metric_stat)
        .return_data(true)
        .build())
}

fn from_message(message: &MessageData) -> ProviderMessage {
    ProviderMessage::new(
        message.code().unwrap_or_default(),
        message.value().unwrap_or_default(),
    )
}

fn from_cloudwatch_result(result: &MetricDataResult) -> Result<DataResult> {
    let datapoints = result
        .timestamps()
        .iter()
        .zip(result.values())
        .map(|(timestamp, value)| {
            let timestamp_ms = timestamp
                .to_millis()
                .context("Timestamp out of range")?;
            Ok(Datapoint::new(timestamp_ms, *value))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DataResult {
        id: result.id().unwrap_or_default().to_string(),
        datapoints,
        messages: result.messages().iter().map(from_message).collect(),
    })
}

/// `ListMetrics` parameters for one listing page.
fn list_metrics_input(request: &ListSeriesRequest) -> ListMetricsInputBuilder {
    let filters = request
        .dimension_filters
        .iter()
        .map(to_cloudwatch_filter)
        .collect::<Vec<_>>();

    ListMetricsInputBuilder::default()
        .set_namespace(request.namespace.clone())
        .set_metric_name(request.metric_name.clone())
        .set_dimensions((!filters.is_empty()).then_some(filters))
        .set_recently_active(
            request
                .recently_active
                .then(|| RecentlyActive::from(RECENTLY_ACTIVE_WINDOW)),
        )
        .set_next_token(request.next_token.clone())
}

fn series_page(output: &ListMetricsOutput) -> SeriesPage {
    SeriesPage {
        series: output.metrics().iter().map(from_cloudwatch_metric).collect(),
        next_token: output.next_token().map(str::to_string),
    }
}

/// `GetMetricData` parameters for one batch.
fn get_metric_data_input(
    queries: &[DataQuery],
    window: &TimeWindow,
) -> Result<GetMetricDataInputBuilder> {
    let queries = queries
        .iter()
        .map(to_cloudwatch_query)
        .collect::<Result<Vec<_>>>()?;

    Ok(GetMetricDataInputBuilder::default()
        .set_metric_data_queries(Some(queries))
        .start_time(DateTime::from_secs(window.start_unix_seconds))
        .end_time(DateTime::from_secs(window.end_unix_seconds)))
}

fn fetch_response(output: &GetMetricDataOutput) -> Result<FetchResponse> {
    let results = output
        .metric_data_results()
        .iter()
        .map(from_cloudwatch_result)
        .collect::<Result<Vec<_>>>()?;

    Ok(FetchResponse {
        results,
        next_token: output.next_token().map(str::to_string),
        messages: output.messages().iter().map(from_message).collect(),
    })
}

#[async_trait]
impl MetricsProvider for CloudWatchProvider {
    async fn list_series(&self, request: &ListSeriesRequest) -> Result<SeriesPage> {
        let input = list_metrics_input(request);
        let output = self
            .client
            .list_metrics()
            .set_namespace(input.get_namespace().clone())
            .set_metric_name(input.get_metric_name().clone())
            .set_dimensions(input.get_dimensions().clone())
            .set_recently_active(input.get_recently_active().clone())
            .set_next_token(input.get_next_token().clone())
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("ListMetrics: {}", DisplayErrorContext(e)))?;

        Ok(series_page(&output))
    }

    async fn fetch_datapoints(
        &self,
        queries: &[DataQuery],
        window: &TimeWindow,
    ) -> Result<FetchResponse> {
        let input = get_metric_data_input(queries, window)?;
        let output = self
            .client
            .get_metric_data()
            .set_metric_data_queries(input.get_metric_data_queries().clone())
            .set_start_time(*input.get_start_time())
            .set_end_time(*input.get_end_time())
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("GetMetricData: {}", DisplayErrorContext(e)))?;

        fetch_response(&output)
    }
}
