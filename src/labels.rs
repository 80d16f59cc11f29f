//! Metric label normalisation.
//!
//! Provider identifiers come in CamelCase, with embedded acronyms and digits
//! (`HTTPCode_ELB_5XX`, `CPUUtilization`, `5xxErrorRate`). Labels are built
//! from them by converting each piece to snake_case.

use crate::datamodel::MetricSeries;
use once_cell::sync::Lazy;
use regex::Regex;

/// Namespace used for series that do not carry one.
const UNKNOWN_NAMESPACE: &str = "Unknown/Namespace";

// A capitalised word that does not already follow a separator.
static WORD_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new("([^_])([A-Z][a-z]+)").expect("valid word boundary regex"));

// Lowercase letter or digit followed by a capital.
static CAPITAL_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new("([a-z0-9])([A-Z])").expect("valid capital boundary regex"));

/// Convert a CamelCase identifier to snake_case.
///
/// The result is always lowercase, so the conversion is idempotent.
pub fn to_snake_case(raw: &str) -> String {
    let snake = WORD_BOUNDARY.replace_all(raw, "${1}_${2}");
    let snake = CAPITAL_BOUNDARY.replace_all(&snake, "${1}_${2}");
    snake.to_lowercase()
}

/// Base label of a series: every namespace segment and the metric name,
/// normalised and joined with `delimiter`.
pub fn build_label_base(series: &MetricSeries, delimiter: &str) -> String {
    let namespace = if series.namespace.is_empty() {
        UNKNOWN_NAMESPACE
    } else {
        series.namespace.as_str()
    };

    let mut parts: Vec<String> = namespace.split('/').map(to_snake_case).collect();
    parts.push(to_snake_case(&series.metric_name));
    parts.join(delimiter)
}

/// Label synthesised for a statistic when no configuration names it.
pub fn synthesize_label(series: &MetricSeries, stat: &str, delimiter: &str) -> String {
    format!("{}.{}", build_label_base(series, delimiter), to_snake_case(stat))
}
