use crate::datamodel::MetricSeries;
use crate::error::CheckError;
use crate::measurement::MeasurementPlan;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    FilteredByMetricOverride { filter: String },
    MissingConfiguration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub series: Arc<MetricSeries>,
    pub reason: RejectionReason,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            RejectionReason::FilteredByMetricOverride { filter } => write!(
                f,
                "Metric: {} filtered by metric-name override {}",
                self.series, filter
            ),
            RejectionReason::MissingConfiguration => {
                write!(f, "No config for Metric: {}", self.series)
            }
        }
    }
}

/// Accumulates the series accepted by a plan across listing pages.
#[derive(Debug)]
pub struct SeriesMatcher<'a> {
    plan: &'a MeasurementPlan,
    strict_missing: bool,
    working_set: Vec<Arc<MetricSeries>>,
    rejections: Vec<Rejection>,
}

impl<'a> SeriesMatcher<'a> {
    pub fn new(plan: &'a MeasurementPlan, strict_missing: bool) -> Self {
        Self {
            plan,
            strict_missing,
            working_set: Vec::new(),
            rejections: Vec::new(),
        }
    }

    /// Feed one page of listed series.
    ///
    /// Accepted series are appended to the working set. Rejections are
    /// recorded; under strict mode a page with series missing from the
    /// configuration fails with every such rejection of the page. Accepted
    /// series of that page are kept either way.
    pub fn add_series(
        &mut self,
        candidates: impl IntoIterator<Item = MetricSeries>,
    ) -> Result<usize, CheckError> {
        let metric_filter = self.plan.configuration.metric_filter.as_deref();
        let mut accepted = 0;
        let mut missing = Vec::new();

        for candidate in candidates {
            let series = Arc::new(candidate);
            let reason = match metric_filter {
                Some(filter) if filter != series.metric_name => {
                    Some(RejectionReason::FilteredByMetricOverride {
                        filter: filter.to_string(),
                    })
                }
                _ if !self.plan.accepts_metric(&series.metric_name) => {
                    Some(RejectionReason::MissingConfiguration)
                }
                _ => None,
            };

            match reason {
                None => {
                    self.working_set.push(series);
                    accepted += 1;
                }
                Some(reason) => {
                    let rejection = Rejection { series, reason };
                    debug!("Rejected series: {}", rejection);
                    if rejection.reason == RejectionReason::MissingConfiguration {
                        missing.push(rejection.to_string());
                    }
                    self.rejections.push(rejection);
                }
            }
        }

        if self.strict_missing && !missing.is_empty() {
            return Err(CheckError::PartialRejection { reasons: missing });
        }
        Ok(accepted)
    }

    pub fn working_set(&self) -> &[Arc<MetricSeries>] {
        &self.working_set
    }

    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    pub fn into_parts(self) -> (Vec<Arc<MetricSeries>>, Vec<Rejection>) {
        (self.working_set, self.rejections)
    }
}
