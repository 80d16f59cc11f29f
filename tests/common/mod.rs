#![allow(dead_code)]

use cloudwatch_check::config::CheckOptions;
use cloudwatch_check::datamodel::MetricSeries;
use cloudwatch_check::engine::{CheckEngine, RunReport};
use cloudwatch_check::error::CheckError;
use cloudwatch_check::test_utils::ScriptedProvider;

pub mod fixtures;

/// Build the engine from options the way the binary does and run it once.
pub async fn run_check(
    provider: &ScriptedProvider,
    options: &CheckOptions,
) -> Result<RunReport, CheckError> {
    let engine = CheckEngine::from_options(provider, options)?;
    engine.run().await
}

/// Options for a literal configuration document.
pub fn custom_options(config_text: &str) -> CheckOptions {
    CheckOptions {
        config_text: Some(config_text.to_string()),
        ..Default::default()
    }
}

pub fn series_with_dimension(
    namespace: &str,
    metric_name: &str,
    name: &str,
    value: &str,
) -> MetricSeries {
    MetricSeries::new(namespace, metric_name).with_dimension(name, value)
}

/// `count` distinct series of the same metric.
pub fn many_series(namespace: &str, metric_name: &str, count: usize) -> Vec<MetricSeries> {
    (0..count)
        .map(|i| series_with_dimension(namespace, metric_name, "Id", &format!("id-{}", i)))
        .collect()
}
