use crate::datamodel::StatConfig;
use serde::{Deserialize, Serialize};

/// Serialized form of a measurement configuration.
///
/// Every field is optional so a document can be layered on top of an
/// existing configuration: absent fields keep their previous value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MeasurementDocument {
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension_filters: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurements: Option<Vec<MeasurementEntry>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementEntry {
    pub metric: String,
    #[serde(default)]
    pub config: Vec<StatConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_document() {
        let text = r#"{
            "namespace": "AWS/ELB",
            "period-minutes": 5,
            "region": "eu-west-1",
            "metric-filter": "Latency",
            "dimension-filters": ["LoadBalancerName"],
            "measurements": [
                {"metric": "Latency", "config": [{"stat": "Average", "measurement": "aws.elb.latency"}]}
            ]
        }"#;
        let document: MeasurementDocument = serde_json::from_str(text).unwrap();
        assert_eq!(document.namespace.as_deref(), Some("AWS/ELB"));
        assert_eq!(document.period_minutes, Some(5));
        assert_eq!(document.region.as_deref(), Some("eu-west-1"));
        assert_eq!(document.metric_filter.as_deref(), Some("Latency"));
        let measurements = document.measurements.unwrap();
        assert_eq!(measurements[0].config[0].label, "aws.elb.latency");
    }

    #[test]
    fn test_absent_fields_stay_unset() {
        let document: MeasurementDocument = serde_json::from_str("{}").unwrap();
        assert_eq!(document, MeasurementDocument::default());

        let text = serde_json::to_string(&document).unwrap();
        assert_eq!(text, r#"{"namespace":null}"#);
    }
}
