//! Measurement configuration: which metrics are relevant and which
//! statistics to request for each of them.

use crate::datamodel::dimension_filter::dedup_filter_strings;
use crate::datamodel::{DimensionFilter, StatConfig, parse_dimension_filters};
use crate::error::CheckError;
use std::collections::BTreeMap;

pub mod document;
pub mod plan;

pub use document::{MeasurementDocument, MeasurementEntry};
pub use plan::{MeasurementPlan, StatSelection};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementConfiguration {
    /// Empty means any namespace.
    pub namespace: String,
    pub metric_filter: Option<String>,
    /// Zero means not set by the configuration.
    pub period_minutes: u32,
    pub region: Option<String>,
    pub dimension_filters: Vec<DimensionFilter>,
    pub measurements: BTreeMap<String, Vec<StatConfig>>,
}

impl MeasurementConfiguration {
    pub fn from_text(text: &str) -> Result<Self, CheckError> {
        let mut configuration = Self::default();
        configuration.load_from_text(text)?;
        Ok(configuration)
    }

    /// Layer a document on top of the current configuration.
    ///
    /// Fields present in the document replace the current ones, except the
    /// dimension filters which are appended. Nothing is applied when the
    /// document is malformed.
    pub fn load_from_text(&mut self, text: &str) -> Result<(), CheckError> {
        let document: MeasurementDocument =
            serde_json::from_str(text).map_err(|e| CheckError::ConfigParse(e.to_string()))?;

        let filters = match &document.dimension_filters {
            Some(expressions) => parse_dimension_filters(expressions)
                .map_err(|e| CheckError::ConfigParse(format!("dimension-filters: {}", e)))?,
            None => Vec::new(),
        };

        if let Some(namespace) = document.namespace {
            self.namespace = namespace;
        }
        if let Some(period_minutes) = document.period_minutes {
            self.period_minutes = period_minutes;
        }
        if let Some(region) = document.region {
            self.region = non_empty(region);
        }
        if let Some(metric_filter) = document.metric_filter {
            self.metric_filter = non_empty(metric_filter);
        }
        self.dimension_filters.extend(filters);
        if let Some(measurements) = document.measurements {
            self.measurements = measurements
                .into_iter()
                .map(|entry| (entry.metric, entry.config))
                .collect();
        }

        Ok(())
    }

    pub fn to_document(&self) -> MeasurementDocument {
        let dimension_filters = dedup_filter_strings(&self.dimension_filters);
        MeasurementDocument {
            namespace: Some(self.namespace.clone()),
            period_minutes: (self.period_minutes > 0).then_some(self.period_minutes),
            region: self.region.clone(),
            metric_filter: self.metric_filter.clone(),
            dimension_filters: (!dimension_filters.is_empty()).then_some(dimension_filters),
            measurements: Some(
                self.measurements
                    .iter()
                    .map(|(metric, config)| MeasurementEntry {
                        metric: metric.clone(),
                        config: config.clone(),
                    })
                    .collect(),
            ),
        }
    }

    pub fn to_text(&self, pretty: bool) -> Result<String, CheckError> {
        document_to_text(&self.to_document(), pretty)
    }

    pub fn accepts_metric(&self, metric_name: &str) -> bool {
        self.measurements.contains_key(metric_name)
    }

    pub fn stats_for(&self, metric_name: &str) -> &[StatConfig] {
        self.measurements
            .get(metric_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn insert_measurement(&mut self, metric_name: impl Into<String>, stats: Vec<StatConfig>) {
        self.measurements.insert(metric_name.into(), stats);
    }

    pub fn add_dimension_filters(&mut self, filters: impl IntoIterator<Item = DimensionFilter>) {
        self.dimension_filters.extend(filters);
    }
}

pub(crate) fn document_to_text(
    document: &MeasurementDocument,
    pretty: bool,
) -> Result<String, CheckError> {
    let text = if pretty {
        serde_json::to_string_pretty(document)
    } else {
        serde_json::to_string(document)
    };
    text.map_err(|e| CheckError::ConfigParse(e.to_string()))
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ELB_DOCUMENT: &str = r#"{
        "namespace": "AWS/ELB",
        "period-minutes": 5,
        "region": "eu-west-1",
        "metric-filter": "Latency",
        "dimension-filters": ["LoadBalancerName", "AvailabilityZone=eu-west-1a", "LoadBalancerName"],
        "measurements": [
            {"metric": "Latency", "config": [
                {"stat": "Average", "measurement": "aws.elb.latency"},
                {"stat": "p95", "measurement": "aws.elb.latency.p95"}
            ]},
            {"metric": "RequestCount", "config": [{"stat": "Sum", "measurement": "aws.elb.request_count"}]}
        ]
    }"#;

    #[test]
    fn test_load_from_text() {
        let configuration = MeasurementConfiguration::from_text(ELB_DOCUMENT).unwrap();
        assert_eq!(configuration.namespace, "AWS/ELB");
        assert_eq!(configuration.period_minutes, 5);
        assert_eq!(configuration.region.as_deref(), Some("eu-west-1"));
        assert_eq!(configuration.metric_filter.as_deref(), Some("Latency"));
        assert_eq!(configuration.dimension_filters.len(), 3);
        assert!(configuration.accepts_metric("Latency"));
        assert!(configuration.accepts_metric("RequestCount"));
        assert!(!configuration.accepts_metric("latency"));
        assert_eq!(configuration.stats_for("Latency").len(), 2);
        assert_eq!(configuration.stats_for("Latency")[1].stat, "p95");
        assert!(configuration.stats_for("Unknown").is_empty());
    }

    #[test]
    fn test_round_trip() {
        let configuration = MeasurementConfiguration::from_text(ELB_DOCUMENT).unwrap();
        for pretty in [false, true] {
            let text = configuration.to_text(pretty).unwrap();
            let reloaded = MeasurementConfiguration::from_text(&text).unwrap();
            assert_eq!(reloaded.namespace, configuration.namespace);
            assert_eq!(reloaded.period_minutes, configuration.period_minutes);
            assert_eq!(reloaded.region, configuration.region);
            assert_eq!(reloaded.metric_filter, configuration.metric_filter);
            assert_eq!(reloaded.measurements, configuration.measurements);
            assert_eq!(
                dedup_filter_strings(&reloaded.dimension_filters),
                dedup_filter_strings(&configuration.dimension_filters)
            );
        }
    }

    #[test]
    fn test_compact_text() {
        let mut configuration = MeasurementConfiguration {
            namespace: "AWS/Test".to_string(),
            ..Default::default()
        };
        configuration.insert_measurement("Metric", vec![StatConfig::new("Sum", "test.metric")]);
        assert_eq!(
            configuration.to_text(false).unwrap(),
            r#"{"namespace":"AWS/Test","measurements":[{"metric":"Metric","config":[{"stat":"Sum","measurement":"test.metric"}]}]}"#
        );
    }

    #[test]
    fn test_partial_override_keeps_prior_values() {
        let mut configuration = MeasurementConfiguration::from_text(ELB_DOCUMENT).unwrap();
        configuration
            .load_from_text(r#"{"period-minutes": 10, "dimension-filters": ["Extra"]}"#)
            .unwrap();
        assert_eq!(configuration.namespace, "AWS/ELB");
        assert_eq!(configuration.period_minutes, 10);
        assert_eq!(configuration.dimension_filters.len(), 4);
        assert!(configuration.accepts_metric("RequestCount"));

        configuration
            .load_from_text(r#"{"measurements": [{"metric": "Other", "config": []}]}"#)
            .unwrap();
        assert!(!configuration.accepts_metric("Latency"));
        assert!(configuration.accepts_metric("Other"));
    }

    #[test]
    fn test_malformed_document_is_not_applied() {
        let mut configuration = MeasurementConfiguration::from_text(ELB_DOCUMENT).unwrap();
        let before = configuration.clone();

        let error = configuration
            .load_from_text(r#"{"namespace": "Other", "measurements": "nope"}"#)
            .unwrap_err();
        assert!(matches!(error, CheckError::ConfigParse(_)));

        let error = configuration
            .load_from_text(r#"{"namespace": "Other", "dimension-filters": ["a=b=c"]}"#)
            .unwrap_err();
        assert!(matches!(error, CheckError::ConfigParse(_)));

        assert!(configuration.load_from_text("not json").is_err());
        assert_eq!(configuration, before);
    }
}
