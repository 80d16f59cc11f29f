#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use clap::Parser;
use cloudwatch_check::config::{CheckOptions, CheckSettings, Cli};
use cloudwatch_check::engine::{CheckEngine, RunSettings};
use cloudwatch_check::measurement::MeasurementPlan;
use cloudwatch_check::provider::create_provider;
use cloudwatch_check::status::RunStatus;
use std::io::Write;
use tracing::{debug, error};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let status = match run(cli) {
        Ok(status) => status,
        Err(err) => {
            error!("Check failed: {:#}", err);
            println!("Error: {:#}", err);
            RunStatus::Critical
        }
    };
    std::process::exit(status.exit_code());
}

// stdout carries the exposition stream, logs go to stderr
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "cloudwatch_check=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

fn run(cli: Cli) -> Result<RunStatus> {
    let settings = CheckSettings::load().context("Failed to load settings")?;
    let options = CheckOptions::merge(cli, settings);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(async_main(options))
}

async fn async_main(options: CheckOptions) -> Result<RunStatus> {
    let plan = MeasurementPlan::build(&options)?;
    debug!("Using {}", plan.describe());

    let provider = create_provider(
        plan.configuration.region.as_deref(),
        options.profile.as_deref(),
    )
    .await
    .context("Failed to create metrics provider")?;

    let engine = CheckEngine::new(provider.as_ref(), plan, RunSettings::from(&options));
    let report = engine.run().await?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(report.output().as_bytes())
        .and_then(|_| stdout.flush())
        .context("Failed to write output")?;

    Ok(report.status)
}
