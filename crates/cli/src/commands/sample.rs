//! The `sample` command: run a sampling session and print its artifacts

use crate::output::{print_info, print_success, print_table, print_warning, OutputFormat};
use advisor_lib::{Sampler, SamplerConfig, SnapshotProvider, StructuredLogger};
use anyhow::Result;
use std::sync::Arc;
use tabled::Tabled;
use tokio::sync::broadcast;
use tracing::debug;

/// Row for the per-metric summary table
#[derive(Tabled, serde::Serialize)]
struct SummaryRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Count")]
    count: u64,
    #[tabled(rename = "Average")]
    average: String,
    #[tabled(rename = "Min")]
    min: String,
    #[tabled(rename = "Max")]
    max: String,
    #[tabled(rename = "StdDev")]
    stddev: String,
}

/// Run a sampling session to completion (or Ctrl-C) and print the session
pub async fn run(
    provider: Arc<dyn SnapshotProvider>,
    config: SamplerConfig,
    logger: &StructuredLogger,
    format: OutputFormat,
) -> Result<()> {
    config.validate()?;

    let sampler = Sampler::new(provider, config.clone());

    // Ctrl-C cancels cooperatively at the next iteration boundary
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Ctrl-C received, requesting cancellation");
            let _ = shutdown_tx.send(());
        }
    });

    print_info(&format!(
        "Sampling {} categories for {}s at {}s intervals",
        config.categories.len(),
        config.duration.as_secs(),
        config.interval.as_secs(),
    ));
    logger.log_session_start(config.total_iterations(), config.interval.as_secs());

    let session = sampler.collect_with_shutdown(shutdown_rx).await;
    signal_task.abort();

    for anomaly in &session.anomalies {
        logger.log_anomaly(anomaly);
    }
    logger.log_session_complete(
        &session.id.to_string(),
        session.data_points.len(),
        session.anomalies.len(),
    );

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
        OutputFormat::Table => {
            let rows: Vec<SummaryRow> = session
                .summary
                .iter()
                .map(|(metric, s)| SummaryRow {
                    metric: metric.clone(),
                    count: s.count,
                    average: format!("{:.2}", s.average),
                    min: format!("{:.2}", s.min),
                    max: format!("{:.2}", s.max),
                    stddev: format!("{:.2}", s.stddev),
                })
                .collect();
            print_table(&rows, format);

            if session.anomalies.is_empty() {
                print_success("No anomalies detected");
            } else {
                for anomaly in &session.anomalies {
                    print_warning(anomaly);
                }
            }
        }
    }

    Ok(())
}
