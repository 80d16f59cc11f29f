use super::{MeasurementConfiguration, MeasurementDocument, MeasurementEntry, document_to_text};
use crate::config::CheckOptions;
use crate::datamodel::{MetricSeries, StatConfig, parse_dimension_filters};
use crate::error::CheckError;
use crate::labels::synthesize_label;
use crate::presets::find_preset;
use std::sync::Arc;

/// Name given to a configuration supplied as literal text.
pub const CUSTOM_PLAN: &str = "Custom";

/// Where the statistics of an accepted series come from.
#[derive(Debug, Clone, PartialEq)]
pub enum StatSelection {
    /// The configuration mapping decides, metric by metric.
    Configured,
    /// No mapping: every series gets these statistics with synthesized labels.
    AdHoc { stats: Vec<String> },
}

/// The active measurement configuration of a run, with the command line
/// overrides already applied.
#[derive(Debug, Clone)]
pub struct MeasurementPlan {
    pub name: String,
    pub description: String,
    pub configuration: MeasurementConfiguration,
    pub selection: StatSelection,
    pub label_delimiter: String,
}

impl MeasurementPlan {
    pub fn configured(name: impl Into<String>, configuration: MeasurementConfiguration) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            configuration,
            selection: StatSelection::Configured,
            label_delimiter: ".".to_string(),
        }
    }

    pub fn ad_hoc(configuration: MeasurementConfiguration, stats: Vec<String>) -> Self {
        Self {
            name: crate::presets::AD_HOC_PRESET.to_string(),
            description: String::new(),
            configuration,
            selection: StatSelection::AdHoc { stats },
            label_delimiter: ".".to_string(),
        }
    }

    /// Resolve the preset or literal configuration selected by the options and
    /// layer the command line values on top of it.
    pub fn build(options: &CheckOptions) -> Result<Self, CheckError> {
        options.validate()?;
        let cli_filters = parse_dimension_filters(&options.dimension_filters)?;
        let preset = find_preset(&options.preset)?;
        let mut configuration = preset.configuration()?;

        let mut plan = match (&options.config_text, preset.is_ad_hoc()) {
            (Some(text), true) => {
                configuration.load_from_text(text)?;
                let mut plan = Self::configured(CUSTOM_PLAN, configuration);
                plan.description = "Custom Config".to_string();
                plan
            }
            (Some(_), false) => {
                return Err(CheckError::InvalidArguments(format!(
                    "--config can only be used with preset None, not {}",
                    preset.name
                )));
            }
            (None, true) => {
                if options.namespace.is_none() && options.metric_filter.is_none() && !options.dry_run {
                    return Err(CheckError::InvalidArguments(
                        "must select at least one of: --config, --namespace, --metric-filter, or --dry-run"
                            .to_string(),
                    ));
                }
                let stats = if options.stats.is_empty() {
                    crate::datamodel::stat_config::default_stats()
                } else {
                    options.stats.clone()
                };
                let mut plan = Self::ad_hoc(configuration, stats);
                plan.description = preset.description.to_string();
                plan
            }
            (None, false) => {
                let mut plan = Self::configured(preset.name, configuration);
                plan.description = preset.description.to_string();
                plan
            }
        };

        let configuration = &mut plan.configuration;
        if configuration.namespace.is_empty() {
            if let Some(namespace) = &options.namespace {
                configuration.namespace = namespace.clone();
            }
        }
        if options.metric_filter.is_some() {
            configuration.metric_filter = options.metric_filter.clone();
        }
        if configuration.period_minutes == 0 {
            configuration.period_minutes = options.period_minutes;
        }
        if configuration.region.is_none() {
            configuration.region = options.region.clone();
        }
        configuration.add_dimension_filters(cli_filters);
        plan.label_delimiter = options.label_delimiter.clone();

        Ok(plan)
    }

    pub fn is_ad_hoc(&self) -> bool {
        matches!(self.selection, StatSelection::AdHoc { .. })
    }

    pub fn accepts_metric(&self, metric_name: &str) -> bool {
        match &self.selection {
            StatSelection::Configured => self.configuration.accepts_metric(metric_name),
            StatSelection::AdHoc { .. } => true,
        }
    }

    pub fn stat_configs_for(&self, series: &MetricSeries) -> Vec<StatConfig> {
        match &self.selection {
            StatSelection::Configured => self.configuration.stats_for(&series.metric_name).to_vec(),
            StatSelection::AdHoc { stats } => stats
                .iter()
                .map(|stat| {
                    StatConfig::new(
                        stat.clone(),
                        synthesize_label(series, stat, &self.label_delimiter),
                    )
                })
                .collect(),
        }
    }

    /// Configuration text for the dump mode.
    ///
    /// Without a mapping, one is synthesized from the accepted series, one
    /// entry per metric name in first-seen order.
    pub fn measurement_text(
        &self,
        working_set: &[Arc<MetricSeries>],
        pretty: bool,
    ) -> Result<String, CheckError> {
        match &self.selection {
            StatSelection::Configured => self.configuration.to_text(pretty),
            StatSelection::AdHoc { .. } => {
                let mut entries: Vec<MeasurementEntry> = Vec::new();
                for series in working_set {
                    if entries.iter().any(|entry| entry.metric == series.metric_name) {
                        continue;
                    }
                    entries.push(MeasurementEntry {
                        metric: series.metric_name.clone(),
                        config: self.stat_configs_for(series),
                    });
                }
                let document = MeasurementDocument {
                    measurements: Some(entries),
                    ..self.configuration.to_document()
                };
                document_to_text(&document, pretty)
            }
        }
    }

    pub fn describe(&self) -> String {
        let mode = match &self.selection {
            StatSelection::Configured => format!(
                "{} configured metric(s)",
                self.configuration.measurements.len()
            ),
            StatSelection::AdHoc { stats } => format!("stats {}", stats.join(",")),
        };
        let namespace = if self.configuration.namespace.is_empty() {
            "any namespace"
        } else {
            self.configuration.namespace.as_str()
        };
        format!("{} ({}): {}, {}", self.name, self.description, namespace, mode)
    }
}
