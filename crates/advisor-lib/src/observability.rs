//! Observability infrastructure for the tuning advisor
//!
//! Provides:
//! - Prometheus metrics (samples, anomalies, sessions, recommendations,
//!   collection latency)
//! - Structured logging with tracing for significant engine events

use prometheus::{register_histogram, register_int_counter, Histogram, IntCounter};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<EngineMetricsInner> = OnceLock::new();

struct EngineMetricsInner {
    collection_latency_seconds: Histogram,
    samples_collected: IntCounter,
    anomalies_detected: IntCounter,
    sessions_completed: IntCounter,
    recommendations_generated: IntCounter,
    collection_errors: IntCounter,
}

impl EngineMetricsInner {
    fn new() -> Self {
        Self {
            collection_latency_seconds: register_histogram!(
                "advisor_collection_latency_seconds",
                "Time spent polling metric categories per iteration",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register collection_latency_seconds"),

            samples_collected: register_int_counter!(
                "advisor_samples_collected_total",
                "Total number of data points collected"
            )
            .expect("Failed to register samples_collected"),

            anomalies_detected: register_int_counter!(
                "advisor_anomalies_detected_total",
                "Total number of anomalies detected"
            )
            .expect("Failed to register anomalies_detected"),

            sessions_completed: register_int_counter!(
                "advisor_sessions_completed_total",
                "Total number of sampling sessions finalized"
            )
            .expect("Failed to register sessions_completed"),

            recommendations_generated: register_int_counter!(
                "advisor_recommendations_generated_total",
                "Total number of recommendation results produced"
            )
            .expect("Failed to register recommendations_generated"),

            collection_errors: register_int_counter!(
                "advisor_collection_errors_total",
                "Total number of failed category queries"
            )
            .expect("Failed to register collection_errors"),
        }
    }
}

/// Engine metrics for Prometheus exposition
///
/// A lightweight handle to the global metrics instance; clones share the
/// same underlying metrics.
#[derive(Clone)]
pub struct EngineMetrics {
    _private: (),
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(EngineMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &EngineMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_collection_latency(&self, duration_secs: f64) {
        self.inner().collection_latency_seconds.observe(duration_secs);
    }

    pub fn inc_samples_collected(&self) {
        self.inner().samples_collected.inc();
    }

    pub fn inc_anomalies_detected(&self) {
        self.inner().anomalies_detected.inc();
    }

    pub fn inc_sessions_completed(&self) {
        self.inner().sessions_completed.inc();
    }

    pub fn inc_recommendations_generated(&self) {
        self.inner().recommendations_generated.inc();
    }

    pub fn inc_collection_errors(&self) {
        self.inner().collection_errors.inc();
    }
}

/// Structured logger for engine events
///
/// Provides consistent field-structured logging for session lifecycle,
/// anomalies, and recommendations.
#[derive(Clone)]
pub struct StructuredLogger {
    host_name: String,
}

impl StructuredLogger {
    pub fn new(host_name: impl Into<String>) -> Self {
        Self {
            host_name: host_name.into(),
        }
    }

    pub fn log_session_start(&self, iterations: usize, interval_secs: u64) {
        info!(
            event = "session_started",
            host = %self.host_name,
            iterations,
            interval_secs,
            "Sampling session started"
        );
    }

    pub fn log_session_complete(
        &self,
        session_id: &str,
        data_points: usize,
        anomalies: usize,
    ) {
        info!(
            event = "session_completed",
            host = %self.host_name,
            session_id = %session_id,
            data_points,
            anomalies,
            "Sampling session completed"
        );
    }

    pub fn log_anomaly(&self, message: &str) {
        warn!(
            event = "anomaly_detected",
            host = %self.host_name,
            anomaly = %message,
            "Anomaly detected"
        );
    }

    pub fn log_classification(&self, category: &str, matched: usize, confidence: f64) {
        info!(
            event = "workload_classified",
            host = %self.host_name,
            category = %category,
            matched_indicators = matched,
            confidence,
            "Workload classified"
        );
    }

    pub fn log_recommendation(
        &self,
        category: &str,
        confidence: f64,
        expected_gain_percent: f64,
        risk: &str,
    ) {
        info!(
            event = "recommendation_generated",
            host = %self.host_name,
            category = %category,
            confidence,
            expected_gain_percent,
            risk = %risk,
            "Recommendation generated"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_metrics_usable() {
        // Metrics register into the global Prometheus registry exactly once.
        let metrics = EngineMetrics::new();
        metrics.observe_collection_latency(0.001);
        metrics.inc_samples_collected();
        metrics.inc_anomalies_detected();
        metrics.inc_sessions_completed();
        metrics.inc_recommendations_generated();
        metrics.inc_collection_errors();
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("workstation-01");
        assert_eq!(logger.host_name, "workstation-01");
    }

    #[test]
    fn test_structured_logger_emits_all_events() {
        let logger = StructuredLogger::new("workstation-01");
        logger.log_session_start(12, 5);
        logger.log_anomaly("CPU.Load: observed 98.00 outside baseline 35.00 +/- 3x0.00");
        logger.log_session_complete("1f0e", 24, 1);
        logger.log_classification("Gaming", 3, 0.7);
        logger.log_recommendation("Gaming", 0.7, 13.5, "Low");
    }
}
