//! Core data models for the tuning advisor engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use uuid::Uuid;

/// Metric categories the sampler can poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetricCategory {
    Cpu,
    Memory,
    Disk,
    Network,
    Thermal,
    Power,
}

impl MetricCategory {
    /// All pollable categories, in polling order
    pub const ALL: [MetricCategory; 6] = [
        MetricCategory::Cpu,
        MetricCategory::Memory,
        MetricCategory::Disk,
        MetricCategory::Network,
        MetricCategory::Thermal,
        MetricCategory::Power,
    ];
}

impl std::fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MetricCategory::Cpu => "CPU",
            MetricCategory::Memory => "Memory",
            MetricCategory::Disk => "Disk",
            MetricCategory::Network => "Network",
            MetricCategory::Thermal => "Thermal",
            MetricCategory::Power => "Power",
        };
        f.write_str(name)
    }
}

/// A single sub-metric reading returned by a snapshot provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricReading {
    pub name: String,
    pub value: f64,
    pub unit: String,
}

impl MetricReading {
    pub fn new(name: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            unit: unit.into(),
        }
    }
}

/// One timestamped observation collected during a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub metric_name: String,
    pub value: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

/// Per-metric statistics computed once at session finalization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSummary {
    pub count: u64,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub stddev: f64,
}

/// A sampling session and its collected artifacts
///
/// The data point sequence is append-only while collection runs and frozen
/// once `end_time` is set. The summary map exists only after finalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub data_points: Vec<DataPoint>,
    /// Distinct anomaly messages in first-seen order
    pub anomalies: Vec<String>,
    pub summary: BTreeMap<String, MetricSummary>,
}

impl Session {
    /// Start a new session at the given instant
    pub fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_time,
            end_time: None,
            data_points: Vec::new(),
            anomalies: Vec::new(),
            summary: BTreeMap::new(),
        }
    }

    /// Append a data point (collection order)
    pub fn record(&mut self, point: DataPoint) {
        debug_assert!(self.end_time.is_none(), "session already finalized");
        self.data_points.push(point);
    }

    /// Record an anomaly message, deduplicated by exact content
    pub fn record_anomaly(&mut self, message: String) {
        if !self.anomalies.iter().any(|m| *m == message) {
            self.anomalies.push(message);
        }
    }

    /// Finalize the session: set the end time and compute per-metric summaries
    ///
    /// Valid on partial sessions (cancellation mid-run).
    pub fn finalize(&mut self, end_time: DateTime<Utc>) {
        self.end_time = Some(end_time);

        let mut grouped: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for point in &self.data_points {
            grouped
                .entry(point.metric_name.as_str())
                .or_default()
                .push(point.value);
        }

        self.summary = grouped
            .into_iter()
            .map(|(name, values)| (name.to_string(), summarize(&values)))
            .collect();
    }

    /// Whether the session has been finalized
    pub fn is_finalized(&self) -> bool {
        self.end_time.is_some()
    }
}

/// Compute summary statistics over a metric's full value set
fn summarize(values: &[f64]) -> MetricSummary {
    let count = values.len() as u64;
    if count == 0 {
        return MetricSummary {
            count: 0,
            average: 0.0,
            min: 0.0,
            max: 0.0,
            stddev: 0.0,
        };
    }

    let average = values.iter().sum::<f64>() / count as f64;
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let variance = values.iter().map(|v| (v - average).powi(2)).sum::<f64>() / count as f64;

    MetricSummary {
        count,
        average,
        min,
        max,
        stddev: variance.sqrt(),
    }
}

/// A sample that deviated beyond the sigma band of its baseline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyEvent {
    pub metric_name: String,
    pub observed_value: f64,
    pub baseline_mean: f64,
    pub baseline_stddev: f64,
    /// Sigma multiplier of the detector that flagged this sample
    pub sigma: f64,
    pub timestamp: DateTime<Utc>,
}

impl AnomalyEvent {
    /// Human-readable message; values are rounded so repeated identical
    /// deviations render identically and deduplicate in the session.
    pub fn message(&self) -> String {
        format!(
            "{}: observed {:.2} outside baseline {:.2} +/- {}x{:.2}",
            self.metric_name,
            self.observed_value,
            self.baseline_mean,
            self.sigma,
            self.baseline_stddev
        )
    }
}

/// Hardware resources under live pressure
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Bottleneck {
    Cpu,
    Memory,
    Thermal,
}

impl std::fmt::Display for Bottleneck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Bottleneck::Cpu => "CPU",
            Bottleneck::Memory => "Memory",
            Bottleneck::Thermal => "Thermal",
        };
        f.write_str(name)
    }
}

/// Live utilization readings used to derive bottlenecks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UtilizationSnapshot {
    pub cpu_utilization_percent: f64,
    pub memory_available_percent: f64,
    pub peak_thermal_celsius: Option<f64>,
}

/// Point-in-time hardware facts supplied once per recommendation run
///
/// Every field other than the bottleneck set is optional; the scorer
/// substitutes neutral defaults for anything missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HardwareFacts {
    pub cpu_cores: Option<u32>,
    pub cpu_threads: Option<u32>,
    pub cpu_max_clock_mhz: Option<u32>,
    pub has_dedicated_gpu: Option<bool>,
    pub total_ram_gb: Option<f64>,
    pub bottlenecks: BTreeSet<Bottleneck>,
}

impl HardwareFacts {
    /// Fraction of optional fields actually present, in [0, 1]
    pub fn completeness(&self) -> f64 {
        let fields = [
            self.cpu_cores.is_some(),
            self.cpu_threads.is_some(),
            self.cpu_max_clock_mhz.is_some(),
            self.has_dedicated_gpu.is_some(),
            self.total_ram_gb.is_some(),
        ];
        let present = fields.iter().filter(|p| **p).count();
        present as f64 / fields.len() as f64
    }
}

/// Workload categories, in tie-break priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WorkloadCategory {
    Gaming,
    Rendering,
    Development,
    Scientific,
    General,
}

impl WorkloadCategory {
    /// Declaration order doubles as the deterministic tie-break order
    pub const ALL: [WorkloadCategory; 5] = [
        WorkloadCategory::Gaming,
        WorkloadCategory::Rendering,
        WorkloadCategory::Development,
        WorkloadCategory::Scientific,
        WorkloadCategory::General,
    ];
}

impl std::fmt::Display for WorkloadCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WorkloadCategory::Gaming => "Gaming",
            WorkloadCategory::Rendering => "Rendering",
            WorkloadCategory::Development => "Development",
            WorkloadCategory::Scientific => "Scientific",
            WorkloadCategory::General => "General",
        };
        f.write_str(name)
    }
}

/// Classifier output: the winning category plus the evidence behind it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadClassification {
    pub category: WorkloadCategory,
    /// Accumulated score per category; all values non-negative
    pub scores: BTreeMap<WorkloadCategory, f64>,
    /// Indicator names that matched at least one signature
    pub matched_indicators: Vec<String>,
    /// Classification confidence in [0, 1]
    pub confidence: f64,
}

impl WorkloadClassification {
    /// A no-evidence classification falling back to the general bucket
    pub fn general(confidence: f64) -> Self {
        Self {
            category: WorkloadCategory::General,
            scores: BTreeMap::new(),
            matched_indicators: Vec::new(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Tunable settings the scorer produces recommendations for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TunableSetting {
    Boost,
    IdleStateDepth,
    Hyperthreading,
    MemoryProfile,
    PowerLimit,
    CoolingCurve,
}

impl TunableSetting {
    pub const ALL: [TunableSetting; 6] = [
        TunableSetting::Boost,
        TunableSetting::IdleStateDepth,
        TunableSetting::Hyperthreading,
        TunableSetting::MemoryProfile,
        TunableSetting::PowerLimit,
        TunableSetting::CoolingCurve,
    ];
}

impl std::fmt::Display for TunableSetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TunableSetting::Boost => "Boost",
            TunableSetting::IdleStateDepth => "Idle State Depth",
            TunableSetting::Hyperthreading => "Hyperthreading",
            TunableSetting::MemoryProfile => "Memory Profile",
            TunableSetting::PowerLimit => "Power Limit",
            TunableSetting::CoolingCurve => "Cooling Curve",
        };
        f.write_str(name)
    }
}

/// Categorical action label derived from a setting weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingAction {
    Maximize,
    Enable,
    Moderate,
    Conservative,
    Minimize,
}

impl std::fmt::Display for SettingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SettingAction::Maximize => "Maximize",
            SettingAction::Enable => "Enable",
            SettingAction::Moderate => "Moderate",
            SettingAction::Conservative => "Conservative",
            SettingAction::Minimize => "Minimize/Disable",
        };
        f.write_str(name)
    }
}

/// Per-setting recommendation entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingRecommendation {
    pub action: SettingAction,
    /// Final normalized weight in [0, 1]
    pub score: f64,
    /// score x 100, rounded to one decimal
    pub confidence_percent: f64,
}

/// Overall recommendation risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    #[serde(rename = "Medium-High")]
    MediumHigh,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::MediumHigh => "Medium-High",
            RiskLevel::High => "High",
        };
        f.write_str(name)
    }
}

/// Recommendation output assembled fresh per scoring invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub workload_category: WorkloadCategory,
    pub confidence: f64,
    pub expected_gain_percent: f64,
    pub risk_level: RiskLevel,
    pub settings: BTreeMap<TunableSetting, SettingRecommendation>,
    pub reasoning: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn point(name: &str, value: f64, offset_secs: i64) -> DataPoint {
        DataPoint {
            timestamp: Utc.timestamp_opt(1_700_000_000 + offset_secs, 0).unwrap(),
            metric_name: name.to_string(),
            value,
            unit: "%".to_string(),
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn test_session_summary_computed_on_finalize() {
        let mut session = Session::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        session.record(point("CPU.Load", 10.0, 0));
        session.record(point("CPU.Load", 20.0, 1));
        session.record(point("CPU.Load", 30.0, 2));
        assert!(session.summary.is_empty());

        session.finalize(Utc.timestamp_opt(1_700_000_010, 0).unwrap());
        assert!(session.is_finalized());

        let summary = session.summary.get("CPU.Load").unwrap();
        assert_eq!(summary.count, 3);
        assert!((summary.average - 20.0).abs() < 1e-9);
        assert!((summary.min - 10.0).abs() < 1e-9);
        assert!((summary.max - 30.0).abs() < 1e-9);
        // Population stddev of [10, 20, 30] is sqrt(200/3)
        assert!((summary.stddev - (200.0f64 / 3.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_anomaly_dedup_exact_message() {
        let mut session = Session::new(Utc::now());
        session.record_anomaly("CPU.Load: observed 98.50 outside baseline 35.00".to_string());
        session.record_anomaly("CPU.Load: observed 98.50 outside baseline 35.00".to_string());
        session.record_anomaly("CPU.Load: observed 99.00 outside baseline 35.00".to_string());
        assert_eq!(session.anomalies.len(), 2);
    }

    #[test]
    fn test_hardware_facts_completeness() {
        let empty = HardwareFacts::default();
        assert!((empty.completeness() - 0.0).abs() < 1e-9);

        let facts = HardwareFacts {
            cpu_cores: Some(8),
            cpu_threads: Some(16),
            cpu_max_clock_mhz: None,
            has_dedicated_gpu: Some(true),
            total_ram_gb: None,
            bottlenecks: BTreeSet::new(),
        };
        assert!((facts.completeness() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_session_serializes_to_json() {
        let mut session = Session::new(Utc::now());
        session.record(point("Memory.AvailableMB", 2048.0, 0));
        session.finalize(Utc::now());

        let json = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back.data_points.len(), 1);
        assert!(back.summary.contains_key("Memory.AvailableMB"));
    }

    #[test]
    fn test_risk_level_json_rename() {
        let json = serde_json::to_string(&RiskLevel::MediumHigh).unwrap();
        assert_eq!(json, "\"Medium-High\"");
    }
}
