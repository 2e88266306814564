//! Recommendation output mapping
//!
//! Converts final setting weights into action labels, derives the overall
//! risk level and expected gain, and assembles the fixed-order reasoning
//! lines.

use crate::models::{
    Bottleneck, HardwareFacts, RiskLevel, SettingAction, WorkloadCategory,
};
use std::collections::BTreeSet;

/// Weight above which a setting is pushed to its maximum
pub const MAXIMIZE_THRESHOLD: f64 = 0.9;
pub const ENABLE_THRESHOLD: f64 = 0.7;
pub const MODERATE_THRESHOLD: f64 = 0.5;
pub const CONSERVATIVE_THRESHOLD: f64 = 0.3;

/// Mean-weight thresholds for the overall risk level
pub const MEDIUM_HIGH_RISK_THRESHOLD: f64 = 0.9;
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.8;

/// Gain nudge per detected bottleneck (percentage points)
pub const GAIN_PER_BOTTLENECK: f64 = 1.5;

/// Map a final weight to its categorical action label
pub fn action_for(weight: f64) -> SettingAction {
    if weight > MAXIMIZE_THRESHOLD {
        SettingAction::Maximize
    } else if weight > ENABLE_THRESHOLD {
        SettingAction::Enable
    } else if weight > MODERATE_THRESHOLD {
        SettingAction::Moderate
    } else if weight > CONSERVATIVE_THRESHOLD {
        SettingAction::Conservative
    } else {
        SettingAction::Minimize
    }
}

/// Overall risk from the mean of all final weights
pub fn risk_for(mean_weight: f64) -> RiskLevel {
    if mean_weight > MEDIUM_HIGH_RISK_THRESHOLD {
        RiskLevel::MediumHigh
    } else if mean_weight > MEDIUM_RISK_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Category-specific expected gain, nudged by bottleneck presence
pub fn expected_gain_percent(category: WorkloadCategory, bottleneck_count: usize) -> f64 {
    let base = match category {
        WorkloadCategory::Gaming => 12.0,
        WorkloadCategory::Rendering => 18.0,
        WorkloadCategory::Development => 8.0,
        WorkloadCategory::Scientific => 15.0,
        WorkloadCategory::General => 5.0,
    };
    base + GAIN_PER_BOTTLENECK * bottleneck_count as f64
}

/// Round to one decimal place (for confidence percentages)
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Assemble the reasoning lines in their fixed order: category, gain,
/// confidence, hardware utilization, risk.
pub fn build_reasoning(
    category: WorkloadCategory,
    expected_gain: f64,
    confidence: f64,
    facts: &HardwareFacts,
    risk: RiskLevel,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(5);
    lines.push(format!(
        "Workload classified as {category} from observed software indicators"
    ));
    lines.push(format!(
        "Estimated performance gain of {expected_gain:.1}% from the recommended tuning profile"
    ));
    lines.push(format!(
        "Overall recommendation confidence: {:.0}%",
        confidence * 100.0
    ));
    lines.push(utilization_line(&facts.bottlenecks));
    lines.push(format!("Risk level: {risk}"));
    lines
}

fn utilization_line(bottlenecks: &BTreeSet<Bottleneck>) -> String {
    if bottlenecks.is_empty() {
        "No hardware resource bottlenecks detected".to_string()
    } else {
        let names: Vec<String> = bottlenecks.iter().map(|b| b.to_string()).collect();
        format!("Hardware under pressure: {}", names.join(", "))
    }
}
