use super::series::MetricSeries;
use std::sync::Arc;
use uuid::Uuid;

/// One statistic of one series, submitted to the provider as part of a batch.
#[derive(Debug, Clone)]
pub struct DataQuery {
    pub id: String,
    pub label: String,
    pub series: Arc<MetricSeries>,
    pub stat: String,
    pub period_seconds: u32,
}

impl DataQuery {
    pub fn new(
        label: impl Into<String>,
        series: Arc<MetricSeries>,
        stat: impl Into<String>,
        period_seconds: u32,
    ) -> Self {
        Self {
            id: new_query_id(),
            label: label.into(),
            series,
            stat: stat.into(),
            period_seconds,
        }
    }
}

/// Provider query ids must start with a lowercase letter and may not contain `-`.
pub fn new_query_id() -> String {
    format!("aws_{}", Uuid::new_v4().to_string().replace('-', "_"))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Datapoint {
    pub timestamp_ms: i64,
    pub value: f64,
}

impl Datapoint {
    pub fn new(timestamp_ms: i64, value: f64) -> Self {
        Self {
            timestamp_ms,
            value,
        }
    }
}

/// Diagnostic attached by the provider to a fetch response or a single result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMessage {
    pub code: String,
    pub message: String,
    /// Label of the query the message was attached to, unset for response level messages.
    pub query_label: Option<String>,
}

impl ProviderMessage {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            query_label: None,
        }
    }

    pub fn for_query(mut self, label: impl Into<String>) -> Self {
        self.query_label = Some(label.into());
        self
    }
}

/// Values returned for one query id.
#[derive(Debug, Clone, Default)]
pub struct DataResult {
    pub id: String,
    pub datapoints: Vec<Datapoint>,
    pub messages: Vec<ProviderMessage>,
}

impl DataResult {
    pub fn new(id: impl Into<String>, datapoints: Vec<Datapoint>) -> Self {
        Self {
            id: id.into(),
            datapoints,
            messages: Vec::new(),
        }
    }

    pub fn has_datapoints(&self) -> bool {
        !self.datapoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_query_ids_are_provider_safe() {
        let id = new_query_id();
        assert!(id.starts_with("aws_"));
        assert!(!id.contains('-'));
        assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
    }

    #[test]
    fn test_query_ids_are_unique() {
        let series = Arc::new(MetricSeries::new("AWS/Test", "Metric"));
        let ids: HashSet<String> = (0..1000)
            .map(|_| DataQuery::new("label", series.clone(), "Average", 60).id)
            .collect();
        assert_eq!(ids.len(), 1000);
    }
}
