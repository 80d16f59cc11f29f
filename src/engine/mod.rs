//! Drives one check run: series listing, query construction, batched
//! fetches and reconciliation of the results.

use crate::batcher::{batches, build_queries};
use crate::config::CheckOptions;
use crate::datamodel::{DataQuery, MetricSeries, ProviderMessage};
use crate::error::CheckError;
use crate::exposition::{ExpositionLine, output_dimensions};
use crate::matcher::{Rejection, SeriesMatcher};
use crate::measurement::MeasurementPlan;
use crate::provider::{ListSeriesRequest, MetricsProvider, TimeWindow};
use crate::status::RunStatus;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub mod reconcile;

pub use reconcile::Reconciler;

/// Run level switches, independent of the measurement plan.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    /// Listing requests allowed, 0 for unlimited.
    pub max_pages: u32,
    pub recently_active: bool,
    pub dry_run: bool,
    pub output_config: bool,
    pub strict_missing: bool,
    pub verbose: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            max_pages: 1,
            recently_active: false,
            dry_run: false,
            output_config: false,
            strict_missing: false,
            verbose: false,
        }
    }
}

impl From<&CheckOptions> for RunSettings {
    fn from(options: &CheckOptions) -> Self {
        Self {
            max_pages: options.max_pages,
            recently_active: options.recently_active,
            dry_run: options.dry_run,
            output_config: options.output_config,
            strict_missing: options.error_on_missing,
            verbose: options.verbose,
        }
    }
}

/// Non-fatal conditions that degrade a run to `Warning`.
#[derive(Debug, Clone, PartialEq)]
pub enum RunWarning {
    PaginationCapExceeded { max_pages: u32 },
    ProviderDiagnostic { messages: Vec<ProviderMessage> },
    NoQueries,
}

impl RunWarning {
    pub fn comment_lines(&self) -> Vec<ExpositionLine> {
        match self {
            RunWarning::PaginationCapExceeded { max_pages } => vec![ExpositionLine::comment(
                format!(
                    "Warning: max allowed ListMetrics result pages ({}) exceeded, either filter via --namespace or --metric-filter option or increase --max-pages value",
                    max_pages
                ),
            )],
            RunWarning::ProviderDiagnostic { messages } => {
                let mut lines = vec![ExpositionLine::comment(
                    "Warning: Some calls to GetMetricData resulted in error messages",
                )];
                lines.extend(messages.iter().map(|m| match &m.query_label {
                    Some(label) => ExpositionLine::comment(format!(
                        "GetMetricData:: Label: {} Code: {} Message: {}",
                        label, m.code, m.message
                    )),
                    None => ExpositionLine::comment(format!(
                        "GetMetricData:: Code: {} Message: {}",
                        m.code, m.message
                    )),
                }));
                lines
            }
            RunWarning::NoQueries => {
                vec![ExpositionLine::comment("Warning: no data queries to process")]
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExecutionSummary {
    pub pages: u32,
    pub series_listed: usize,
    pub series_accepted: usize,
    pub rejections: Vec<Rejection>,
    pub queries: usize,
    pub batches: usize,
    pub results: usize,
    pub unused: Vec<DataQuery>,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub status: RunStatus,
    /// Exposition stream, data lines first then warning comments.
    pub lines: Vec<ExpositionLine>,
    /// Measurement configuration text, in configuration dump mode.
    pub document: Option<String>,
    pub summary: ExecutionSummary,
    pub warnings: Vec<RunWarning>,
}

impl RunReport {
    fn warn(&mut self, warning: RunWarning) {
        self.status = self.status.degrade(RunStatus::Warning);
        self.warnings.push(warning);
    }

    /// Everything to print on the standard output.
    pub fn output(&self) -> String {
        match &self.document {
            Some(document) => format!("{}\n", document),
            None => crate::exposition::render(&self.lines),
        }
    }
}

struct Listing {
    working_set: Vec<Arc<MetricSeries>>,
    rejections: Vec<Rejection>,
    pages: u32,
    series_listed: usize,
    cap_exceeded: bool,
}

pub struct CheckEngine<'a, P: MetricsProvider + ?Sized> {
    provider: &'a P,
    plan: MeasurementPlan,
    settings: RunSettings,
}

impl<'a, P: MetricsProvider + ?Sized> CheckEngine<'a, P> {
    pub fn new(provider: &'a P, plan: MeasurementPlan, settings: RunSettings) -> Self {
        Self {
            provider,
            plan,
            settings,
        }
    }

    pub fn from_options(provider: &'a P, options: &CheckOptions) -> Result<Self, CheckError> {
        let plan = MeasurementPlan::build(options)?;
        Ok(Self::new(provider, plan, RunSettings::from(options)))
    }

    pub fn plan(&self) -> &MeasurementPlan {
        &self.plan
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub async fn run(&self) -> Result<RunReport, CheckError> {
        debug!("Measurement plan: {}", self.plan.describe());
        let mut report = RunReport::default();

        let listing = self.list_series().await?;
        report.summary.pages = listing.pages;
        report.summary.series_listed = listing.series_listed;
        report.summary.series_accepted = listing.working_set.len();
        report.summary.rejections = listing.rejections;
        if self.settings.verbose {
            info!(
                "Found {} metrics, {} accepted, result pages {}",
                listing.series_listed,
                listing.working_set.len(),
                listing.pages
            );
        }

        if self.settings.output_config {
            report.document = Some(self.plan.measurement_text(&listing.working_set, true)?);
            if listing.cap_exceeded {
                report.warn(RunWarning::PaginationCapExceeded {
                    max_pages: self.settings.max_pages,
                });
            }
            return Ok(report);
        }

        let queries = build_queries(&self.plan, &listing.working_set, self.period_minutes());
        report.summary.queries = queries.len();

        if queries.is_empty() {
            warn!("No data queries to process");
            report.warn(RunWarning::NoQueries);
        } else {
            let messages = self.fetch_all(&queries, &mut report).await?;
            if !messages.is_empty() {
                report.warn(RunWarning::ProviderDiagnostic { messages });
            }
        }

        if listing.cap_exceeded {
            report.warn(RunWarning::PaginationCapExceeded {
                max_pages: self.settings.max_pages,
            });
        }

        let comments: Vec<ExpositionLine> = report
            .warnings
            .iter()
            .flat_map(RunWarning::comment_lines)
            .collect();
        report.lines.extend(comments);

        if self.settings.verbose {
            self.log_summary(&report.summary);
        }
        Ok(report)
    }

    fn period_minutes(&self) -> u32 {
        self.plan.configuration.period_minutes.max(1)
    }

    fn list_request(&self) -> ListSeriesRequest {
        let configuration = &self.plan.configuration;
        ListSeriesRequest {
            namespace: (!configuration.namespace.is_empty())
                .then(|| configuration.namespace.clone()),
            metric_name: configuration.metric_filter.clone(),
            dimension_filters: configuration.dimension_filters.clone(),
            recently_active: self.settings.recently_active,
            next_token: None,
        }
    }

    async fn list_series(&self) -> Result<Listing, CheckError> {
        let mut matcher = SeriesMatcher::new(&self.plan, self.settings.strict_missing);
        let mut request = self.list_request();
        let mut pages = 0;
        let mut series_listed = 0;
        let mut cap_exceeded = false;

        loop {
            let page = self
                .provider
                .list_series(&request)
                .await
                .map_err(|e| CheckError::transport("list series", e))?;
            pages += 1;
            series_listed += page.series.len();
            let accepted = matcher.add_series(page.series)?;
            debug!("Listing page {}: {} series accepted", pages, accepted);

            let Some(token) = page.next_token else {
                break;
            };
            if self.settings.max_pages > 0 && pages >= self.settings.max_pages {
                warn!(
                    "Max allowed ListMetrics result pages ({}) exceeded",
                    self.settings.max_pages
                );
                cap_exceeded = true;
                break;
            }
            request.next_token = Some(token);
        }

        let (working_set, rejections) = matcher.into_parts();
        Ok(Listing {
            working_set,
            rejections,
            pages,
            series_listed,
            cap_exceeded,
        })
    }

    /// Fetch every batch in order, appending data lines to the report.
    /// Returns the provider diagnostics collected along the way.
    async fn fetch_all(
        &self,
        queries: &[DataQuery],
        report: &mut RunReport,
    ) -> Result<Vec<ProviderMessage>, CheckError> {
        let region = self.plan.configuration.region.as_deref();
        let mut reconciler = Reconciler::new(queries);
        let mut messages = Vec::new();

        for (index, batch) in batches(queries).enumerate() {
            report.summary.batches += 1;
            debug!("Batch {}: {} queries", index + 1, batch.len());

            if self.settings.dry_run {
                report
                    .lines
                    .extend(batch.iter().map(|query| ExpositionLine::Placeholder {
                        label: query.label.clone(),
                        dimensions: output_dimensions(&query.series.dimensions, region),
                    }));
                reconciler.mark_used(batch);
                continue;
            }

            let window = TimeWindow::ending_now(self.period_minutes())
                .map_err(|e| CheckError::transport("fetch datapoints", e))?;
            let response = self
                .provider
                .fetch_datapoints(batch, &window)
                .await
                .map_err(|e| CheckError::transport("fetch datapoints", e))?;
            if response.next_token.is_some() {
                return Err(CheckError::FetchPaginationUnsupported);
            }
            if !response.messages.is_empty() {
                warn!("GetMetricData returned {} message(s)", response.messages.len());
            }
            messages.extend(response.messages.iter().cloned());
            report.summary.results += response.results.len();

            for (query, result) in reconciler.resolve(&response.results)? {
                messages.extend(
                    result
                        .messages
                        .iter()
                        .map(|message| message.clone().for_query(&query.label)),
                );
                let dimensions = output_dimensions(&query.series.dimensions, region);
                report
                    .lines
                    .extend(result.datapoints.iter().map(|point| ExpositionLine::Sample {
                        label: query.label.clone(),
                        dimensions: dimensions.clone(),
                        value: point.value,
                        timestamp_ms: point.timestamp_ms,
                    }));
            }
        }

        report.summary.unused = reconciler.unused().cloned().collect();
        Ok(messages)
    }

    fn log_summary(&self, summary: &ExecutionSummary) {
        let region = self.plan.configuration.region.as_deref().unwrap_or("");
        info!("Execution Summary:");
        info!("  MetricDataQueries: {}", summary.queries);
        info!("  Number of MetricDataResults: {}", summary.results);
        info!("  Rejected series: {}", summary.rejections.len());
        if !summary.unused.is_empty() {
            info!("  MetricDataQueries with no results:");
            for query in &summary.unused {
                let dimensions = query
                    .series
                    .dimensions
                    .iter()
                    .map(|d| format!("{}={}", d.name, d.value))
                    .collect::<Vec<_>>()
                    .join(",");
                info!(
                    "    Label: {} Namespace: {} MetricName: {} Region: {} Dimensions: {}",
                    query.label,
                    query.series.namespace,
                    query.series.metric_name,
                    region,
                    dimensions
                );
            }
        }
    }
}
