use serde::{Deserialize, Serialize};

/// Statistics requested when no configuration document names any.
pub const DEFAULT_STATS: [&str; 5] = ["Average", "Sum", "SampleCount", "Maximum", "Minimum"];

/// A statistic to request for a metric and the label its values are emitted under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatConfig {
    pub stat: String,
    #[serde(rename = "measurement")]
    pub label: String,
}

impl StatConfig {
    pub fn new(stat: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            stat: stat.into(),
            label: label.into(),
        }
    }
}

pub fn default_stats() -> Vec<String> {
    DEFAULT_STATS.iter().map(|stat| stat.to_string()).collect()
}
