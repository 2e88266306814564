//! The `recommend` command: classify the workload and score tuning
//! recommendations

use crate::output::{color_confidence, color_risk, print_info, print_table, OutputFormat};
use advisor_lib::{
    detect_bottlenecks, BottleneckThresholds, EngineMetrics, Scorer, SnapshotProvider,
    StructuredLogger, WorkloadClassifier,
};
use anyhow::Result;
use std::sync::Arc;
use tabled::Tabled;

/// Row for the per-setting recommendation table
#[derive(Tabled, serde::Serialize)]
struct SettingRow {
    #[tabled(rename = "Setting")]
    setting: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
}

/// Gather indicators, classify the workload, and print a scored
/// recommendation
pub async fn run(
    provider: Arc<dyn SnapshotProvider>,
    thresholds: BottleneckThresholds,
    logger: &StructuredLogger,
    format: OutputFormat,
) -> Result<()> {
    // Indicators: running processes plus installed software, best effort
    let mut indicators = provider.running_process_names().await.unwrap_or_default();
    indicators.extend(
        provider
            .installed_software_names()
            .await
            .unwrap_or_default(),
    );

    let classifier = WorkloadClassifier::default();
    let classification = classifier.classify(&indicators);
    logger.log_classification(
        &classification.category.to_string(),
        classification.matched_indicators.len(),
        classification.confidence,
    );

    // Hardware facts degrade to neutral defaults when unavailable
    let mut facts = provider.hardware_facts().await.unwrap_or_default();
    if let Ok(utilization) = provider.utilization().await {
        facts.bottlenecks = detect_bottlenecks(&utilization, &thresholds);
    }

    let scorer = Scorer::default();
    let result = scorer.score(&facts, &classification);
    EngineMetrics::new().inc_recommendations_generated();
    logger.log_recommendation(
        &result.workload_category.to_string(),
        result.confidence,
        result.expected_gain_percent,
        &result.risk_level.to_string(),
    );

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Table => {
            print_info(&format!(
                "Workload: {} (confidence {})",
                result.workload_category,
                color_confidence(result.confidence)
            ));
            print_info(&format!(
                "Expected gain: {:.1}%  Risk: {}",
                result.expected_gain_percent,
                color_risk(&result.risk_level.to_string())
            ));

            let rows: Vec<SettingRow> = result
                .settings
                .iter()
                .map(|(setting, rec)| SettingRow {
                    setting: setting.to_string(),
                    action: rec.action.to_string(),
                    score: format!("{:.2}", rec.score),
                    confidence: format!("{:.1}%", rec.confidence_percent),
                })
                .collect();
            print_table(&rows, format);

            for line in &result.reasoning {
                println!("  - {line}");
            }
        }
    }

    Ok(())
}
