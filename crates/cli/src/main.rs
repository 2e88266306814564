//! Host Tuning Advisor CLI
//!
//! Samples host telemetry into sessions with baseline-driven anomaly
//! detection, classifies the running workload, and scores per-setting
//! tuning recommendations.

mod commands;
mod config;
mod output;
mod provider;

use advisor_lib::{MetricCategory, SamplerConfig, StructuredLogger};
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Host Tuning Advisor CLI
#[derive(Parser)]
#[command(name = "hta")]
#[command(author, version, about = "Telemetry and tuning recommendations for this host", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a metric sampling session
    Sample {
        /// Total sampling duration in seconds
        #[arg(long, short)]
        duration: Option<u64>,

        /// Interval between samples in seconds (minimum 1)
        #[arg(long, short)]
        interval: Option<u64>,

        /// Metric categories to poll
        #[arg(long, short, value_enum, num_args = 1..)]
        categories: Option<Vec<CategoryArg>>,

        /// Fraction of iterations used for the baseline window
        #[arg(long)]
        baseline_fraction: Option<f64>,
    },

    /// Classify the workload and score tuning recommendations
    Recommend,
}

/// CLI-facing metric category names
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    Cpu,
    Memory,
    Disk,
    Network,
    Thermal,
    Power,
}

impl From<CategoryArg> for MetricCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Cpu => MetricCategory::Cpu,
            CategoryArg::Memory => MetricCategory::Memory,
            CategoryArg::Disk => MetricCategory::Disk,
            CategoryArg::Network => MetricCategory::Network,
            CategoryArg::Thermal => MetricCategory::Thermal,
            CategoryArg::Power => MetricCategory::Power,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(fmt::layer())
        .init();

    let app_config = config::CliConfig::load()?;
    let logger = StructuredLogger::new(&app_config.host_name);
    let provider = Arc::new(provider::LiveProvider::new());

    match cli.command {
        Commands::Sample {
            duration,
            interval,
            categories,
            baseline_fraction,
        } => {
            let defaults = SamplerConfig::default();
            let sampler_config = SamplerConfig {
                duration: Duration::from_secs(
                    duration.unwrap_or(app_config.sample_duration_secs),
                ),
                interval: Duration::from_secs(
                    interval.unwrap_or(app_config.sample_interval_secs),
                ),
                categories: categories
                    .map(|list| {
                        list.into_iter()
                            .map(MetricCategory::from)
                            .collect::<BTreeSet<_>>()
                    })
                    .unwrap_or(defaults.categories),
                baseline_fraction: baseline_fraction.unwrap_or(app_config.baseline_fraction),
            };
            commands::sample::run(provider, sampler_config, &logger, cli.format).await?;
        }
        Commands::Recommend => {
            commands::recommend::run(
                provider,
                app_config.bottleneck_thresholds(),
                &logger,
                cli.format,
            )
            .await?;
        }
    }

    Ok(())
}
