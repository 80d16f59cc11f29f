use crate::datamodel::stat_config::default_stats;
use crate::error::CheckError;
use crate::presets::AD_HOC_PRESET;
use anyhow::Error;
use clap::Parser;
use confique::Config;

/// Settings read from the environment and from an optional settings file.
///
/// Command line flags take precedence over every value here.
#[derive(Debug, Config)]
pub struct CheckSettings {
    #[config(env = "AWS_REGION")]
    pub region: Option<String>,

    #[config(env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Measurement configuration document, as literal JSON text.
    #[config(env = "CLOUDWATCH_CHECK_CONFIG")]
    pub config: Option<String>,

    #[config(env = "CLOUDWATCH_CHECK_NAMESPACE")]
    pub namespace: Option<String>,

    #[config(
        env = "CLOUDWATCH_CHECK_DIMENSION_FILTERS",
        parse_env = confique::env::parse::list_by_comma
    )]
    pub dimension_filters: Option<Vec<String>>,

    #[config(
        env = "CLOUDWATCH_CHECK_STATS",
        parse_env = confique::env::parse::list_by_comma,
        default = ["Average", "Sum", "SampleCount", "Maximum", "Minimum"]
    )]
    pub stats: Vec<String>,

    #[config(env = "CLOUDWATCH_CHECK_METRIC_FILTER")]
    pub metric_filter: Option<String>,

    #[config(env = "CLOUDWATCH_CHECK_PRESET", default = "None")]
    pub preset: String,

    #[config(env = "CLOUDWATCH_CHECK_MAX_PAGES", default = 1)]
    pub max_pages: u32,

    #[config(env = "CLOUDWATCH_CHECK_PERIOD_MINUTES", default = 1)]
    pub period_minutes: u32,

    #[config(env = "CLOUDWATCH_CHECK_ERROR_ON_MISSING", default = false)]
    pub error_on_missing: bool,

    #[config(env = "CLOUDWATCH_CHECK_LABEL_DELIMITER", default = ".")]
    pub label_delimiter: String,
}

impl CheckSettings {
    pub fn load() -> Result<CheckSettings, Error> {
        let c = CheckSettings::builder()
            .env()
            .file("cloudwatch-check.toml")
            .load()?;

        Ok(c)
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "cloudwatch-check",
    version,
    about = "Collect CloudWatch metrics and print them as exposition lines"
)]
pub struct Cli {
    /// AWS region (overrides AWS_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// AWS credential profile (prefer AWS_PROFILE)
    #[arg(long)]
    pub profile: Option<String>,

    /// Print the measurement configuration JSON instead of collecting data
    #[arg(short = 'o', long)]
    pub output_config: bool,

    /// Measurement configuration JSON text to use
    #[arg(short = 'c', long)]
    pub config: Option<String>,

    /// Only list metrics active in the last three hours
    #[arg(long)]
    pub recently_active: bool,

    /// Namespace to restrict the metric listing to
    #[arg(short = 'N', long)]
    pub namespace: Option<String>,

    /// Comma separated `Name` or `Name=Value` dimension filters
    #[arg(short = 'D', long, value_delimiter = ',')]
    pub dimension_filters: Option<Vec<String>>,

    /// Comma separated statistics, used when no preset is active
    #[arg(short = 'S', long, value_delimiter = ',')]
    pub stats: Option<Vec<String>>,

    /// Only collect this metric name
    #[arg(short = 'M', long)]
    pub metric_filter: Option<String>,

    /// Service preset, one of None, CLB, ALB, EC2, CloudFront
    #[arg(short = 'P', long)]
    pub preset: Option<String>,

    /// Maximum ListMetrics result pages, 0 for unlimited
    #[arg(short = 'm', long)]
    pub max_pages: Option<u32>,

    /// Statistics period and look-back window, in minutes
    #[arg(short = 'p', long)]
    pub period_minutes: Option<u32>,

    /// Log progress and an execution summary to stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Fail when a listed metric has no configuration entry
    #[arg(long)]
    pub error_on_missing: bool,

    /// List matching metrics without fetching any data
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

/// Everything a run needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOptions {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub preset: String,
    pub config_text: Option<String>,
    pub namespace: Option<String>,
    pub metric_filter: Option<String>,
    pub dimension_filters: Vec<String>,
    pub stats: Vec<String>,
    pub max_pages: u32,
    pub period_minutes: u32,
    pub recently_active: bool,
    pub dry_run: bool,
    pub output_config: bool,
    pub verbose: bool,
    pub error_on_missing: bool,
    pub label_delimiter: String,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            region: None,
            profile: None,
            preset: AD_HOC_PRESET.to_string(),
            config_text: None,
            namespace: None,
            metric_filter: None,
            dimension_filters: Vec::new(),
            stats: default_stats(),
            max_pages: 1,
            period_minutes: 1,
            recently_active: false,
            dry_run: false,
            output_config: false,
            verbose: false,
            error_on_missing: false,
            label_delimiter: ".".to_string(),
        }
    }
}

impl CheckOptions {
    /// Merge command line flags over the loaded settings.
    pub fn merge(cli: Cli, settings: CheckSettings) -> Self {
        Self {
            region: non_blank(cli.region.or(settings.region)),
            profile: non_blank(cli.profile.or(settings.profile)),
            preset: cli.preset.unwrap_or(settings.preset).trim().to_string(),
            config_text: non_blank(cli.config.or(settings.config)),
            namespace: non_blank(cli.namespace.or(settings.namespace)),
            metric_filter: non_blank(cli.metric_filter.or(settings.metric_filter)),
            dimension_filters: clean_list(
                cli.dimension_filters
                    .or(settings.dimension_filters)
                    .unwrap_or_default(),
            ),
            stats: clean_list(cli.stats.unwrap_or(settings.stats)),
            max_pages: cli.max_pages.unwrap_or(settings.max_pages),
            period_minutes: cli.period_minutes.unwrap_or(settings.period_minutes),
            recently_active: cli.recently_active,
            dry_run: cli.dry_run,
            output_config: cli.output_config,
            verbose: cli.verbose,
            error_on_missing: cli.error_on_missing || settings.error_on_missing,
            label_delimiter: settings.label_delimiter,
        }
    }

    /// Checks that do not depend on the selected preset.
    pub fn validate(&self) -> Result<(), CheckError> {
        if self.period_minutes == 0 {
            return Err(CheckError::InvalidArguments(
                "--period-minutes must be greater than 0".to_string(),
            ));
        }
        if self.preset.is_empty() {
            return Err(CheckError::InvalidArguments("no preset selected".to_string()));
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_load_settings_defaults() {
        temp_env::with_vars_unset(
            [
                "AWS_REGION",
                "AWS_PROFILE",
                "CLOUDWATCH_CHECK_CONFIG",
                "CLOUDWATCH_CHECK_NAMESPACE",
                "CLOUDWATCH_CHECK_DIMENSION_FILTERS",
                "CLOUDWATCH_CHECK_STATS",
                "CLOUDWATCH_CHECK_PRESET",
                "CLOUDWATCH_CHECK_MAX_PAGES",
                "CLOUDWATCH_CHECK_PERIOD_MINUTES",
            ],
            || {
                let settings = CheckSettings::load().unwrap();
                assert_eq!(settings.preset, "None");
                assert_eq!(settings.max_pages, 1);
                assert_eq!(settings.period_minutes, 1);
                assert_eq!(settings.stats, default_stats());
                assert_eq!(settings.label_delimiter, ".");
                assert!(settings.region.is_none());
                assert!(settings.dimension_filters.is_none());
            },
        );
    }

    #[test]
    #[serial]
    fn test_load_settings_from_env() {
        temp_env::with_vars(
            [
                ("AWS_REGION", Some("eu-north-1")),
                ("CLOUDWATCH_CHECK_PRESET", Some("EC2")),
                ("CLOUDWATCH_CHECK_MAX_PAGES", Some("0")),
                ("CLOUDWATCH_CHECK_STATS", Some("Average,p95")),
                ("CLOUDWATCH_CHECK_DIMENSION_FILTERS", Some("InstanceId,AutoScalingGroupName=web")),
            ],
            || {
                let settings = CheckSettings::load().unwrap();
                assert_eq!(settings.region.as_deref(), Some("eu-north-1"));
                assert_eq!(settings.preset, "EC2");
                assert_eq!(settings.max_pages, 0);
                assert_eq!(settings.stats, vec!["Average", "p95"]);
                assert_eq!(
                    settings.dimension_filters,
                    Some(vec![
                        "InstanceId".to_string(),
                        "AutoScalingGroupName=web".to_string()
                    ])
                );
            },
        );
    }

    #[test]
    #[serial]
    fn test_cli_overrides_settings() {
        temp_env::with_vars(
            [
                ("CLOUDWATCH_CHECK_NAMESPACE", Some("AWS/EC2")),
                ("CLOUDWATCH_CHECK_PERIOD_MINUTES", Some("5")),
                ("CLOUDWATCH_CHECK_PRESET", None::<&str>),
            ],
            || {
                let settings = CheckSettings::load().unwrap();
                let cli = Cli::parse_from([
                    "cloudwatch-check",
                    "-N",
                    "AWS/ELB",
                    "-D",
                    "LoadBalancerName, AvailabilityZone",
                    "--stats",
                    "Sum",
                    "-n",
                ]);
                let options = CheckOptions::merge(cli, settings);
                assert_eq!(options.namespace.as_deref(), Some("AWS/ELB"));
                assert_eq!(options.period_minutes, 5);
                assert_eq!(
                    options.dimension_filters,
                    vec!["LoadBalancerName", "AvailabilityZone"]
                );
                assert_eq!(options.stats, vec!["Sum"]);
                assert!(options.dry_run);
                assert_eq!(options.preset, "None");
            },
        );
    }

    #[test]
    #[serial]
    fn test_preset_name_is_trimmed() {
        temp_env::with_vars([("CLOUDWATCH_CHECK_PRESET", Some(" ALB"))], || {
            let settings = CheckSettings::load().unwrap();
            let options = CheckOptions::merge(Cli::parse_from(["cloudwatch-check"]), settings);
            assert_eq!(options.preset, "ALB");

            let settings = CheckSettings::load().unwrap();
            let cli = Cli::parse_from(["cloudwatch-check", "-P", "EC2 "]);
            let options = CheckOptions::merge(cli, settings);
            assert_eq!(options.preset, "EC2");
        });
    }

    #[test]
    #[serial]
    fn test_blank_preset_is_rejected() {
        temp_env::with_vars([("CLOUDWATCH_CHECK_PRESET", None::<&str>)], || {
            let settings = CheckSettings::load().unwrap();
            let cli = Cli::parse_from(["cloudwatch-check", "-P", "  "]);
            let options = CheckOptions::merge(cli, settings);
            assert!(matches!(
                options.validate(),
                Err(CheckError::InvalidArguments(_))
            ));
        });
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "cloudwatch-check",
            "-P",
            "ALB",
            "-m",
            "3",
            "-p",
            "5",
            "-o",
            "-v",
            "--recently-active",
            "--error-on-missing",
            "-M",
            "RequestCount",
        ]);
        assert_eq!(cli.preset.as_deref(), Some("ALB"));
        assert_eq!(cli.max_pages, Some(3));
        assert_eq!(cli.period_minutes, Some(5));
        assert!(cli.output_config);
        assert!(cli.verbose);
        assert!(cli.recently_active);
        assert!(cli.error_on_missing);
        assert_eq!(cli.metric_filter.as_deref(), Some("RequestCount"));
    }

    #[test]
    fn test_validate() {
        assert!(CheckOptions::default().validate().is_ok());

        let options = CheckOptions {
            period_minutes: 0,
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(CheckError::InvalidArguments(_))
        ));
    }
}
