//! The sampling loop

use super::{Clock, ConfigError, SnapshotProvider, SystemClock};
use crate::anomaly::SigmaDetector;
use crate::baseline::{BaselineTracker, DEFAULT_BASELINE_FRACTION};
use crate::models::{DataPoint, MetricCategory, Session};
use crate::observability::EngineMetrics;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Smallest supported sampling interval
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for one sampling session
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// Total sampling duration
    pub duration: Duration,
    /// Interval between iterations (at least 1 second)
    pub interval: Duration,
    /// Metric categories to poll each iteration
    pub categories: BTreeSet<MetricCategory>,
    /// Leading fraction of iterations that feeds the baseline
    pub baseline_fraction: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(60),
            interval: Duration::from_secs(5),
            categories: BTreeSet::from([MetricCategory::Cpu, MetricCategory::Memory]),
            baseline_fraction: DEFAULT_BASELINE_FRACTION,
        }
    }
}

impl SamplerConfig {
    /// Number of poll iterations: `ceil(duration / interval)`
    pub fn total_iterations(&self) -> usize {
        let interval = self.interval.max(MIN_INTERVAL);
        let iterations = (self.duration.as_secs_f64() / interval.as_secs_f64()).ceil() as usize;
        iterations.max(1)
    }

    /// Reject configurations the loop cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration.is_zero() {
            return Err(ConfigError::ZeroDuration);
        }
        if self.interval < MIN_INTERVAL {
            return Err(ConfigError::IntervalTooShort(self.interval));
        }
        if !(self.baseline_fraction > 0.0 && self.baseline_fraction <= 1.0) {
            return Err(ConfigError::BaselineFractionOutOfRange(
                self.baseline_fraction,
            ));
        }
        if self.categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }
        Ok(())
    }
}

/// Runs sampling sessions against a snapshot provider
///
/// Single-threaded and cooperative: iterations never overlap, and baseline
/// accumulation plus anomaly evaluation run inline with the sample that
/// triggered them.
pub struct Sampler {
    provider: Arc<dyn SnapshotProvider>,
    clock: Arc<dyn Clock>,
    detector: SigmaDetector,
    config: SamplerConfig,
    metrics: EngineMetrics,
}

impl Sampler {
    pub fn new(provider: Arc<dyn SnapshotProvider>, config: SamplerConfig) -> Self {
        Self {
            provider,
            clock: Arc::new(SystemClock),
            detector: SigmaDetector::default(),
            config,
            metrics: EngineMetrics::new(),
        }
    }

    /// Replace the clock (deterministic tests)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the anomaly detector
    pub fn with_detector(mut self, detector: SigmaDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Run a full session to completion
    pub async fn collect(&self) -> Session {
        // Sender kept alive for the duration so the loop never observes a
        // closed channel.
        let (_tx, rx) = broadcast::channel(1);
        self.collect_with_shutdown(rx).await
    }

    /// Run a session with cooperative cancellation
    ///
    /// A shutdown signal is honored at the next iteration boundary, never
    /// mid-sample; the session is finalized with whatever was collected.
    pub async fn collect_with_shutdown(&self, mut shutdown: broadcast::Receiver<()>) -> Session {
        let total = self.config.total_iterations();
        let interval = self.config.interval.max(MIN_INTERVAL);
        let mut session = Session::new(self.clock.now());
        let mut baseline = BaselineTracker::new(total, self.config.baseline_fraction);

        info!(
            session_id = %session.id,
            total_iterations = total,
            interval_secs = interval.as_secs(),
            baseline_iterations = baseline.baseline_iterations(),
            "Starting sampling session"
        );

        for iteration in 0..total {
            if shutdown.try_recv().is_ok() {
                info!(iteration, "Cancellation requested, finalizing partial session");
                break;
            }

            let iter_start = self.clock.now();
            self.sample_iteration(iteration, &mut session, &mut baseline)
                .await;

            let elapsed = (self.clock.now() - iter_start)
                .to_std()
                .unwrap_or_default();
            self.metrics
                .observe_collection_latency(elapsed.as_secs_f64());

            // Sleep the remainder of the interval, except after the final
            // iteration.
            if iteration + 1 < total {
                let remaining = interval.saturating_sub(elapsed);
                tokio::select! {
                    _ = self.clock.sleep(remaining) => {}
                    received = shutdown.recv() => {
                        if received.is_ok() {
                            info!(iteration, "Cancellation requested during sleep");
                            break;
                        }
                        // Sender dropped: nothing can cancel us anymore.
                        self.clock.sleep(remaining).await;
                    }
                }
            }
        }

        session.finalize(self.clock.now());
        self.metrics.inc_sessions_completed();
        info!(
            session_id = %session.id,
            data_points = session.data_points.len(),
            anomalies = session.anomalies.len(),
            metrics = session.summary.len(),
            "Sampling session complete"
        );
        session
    }

    /// Poll every enabled category once and process the readings inline
    async fn sample_iteration(
        &self,
        iteration: usize,
        session: &mut Session,
        baseline: &mut BaselineTracker,
    ) {
        for category in &self.config.categories {
            match self.provider.query_category(*category).await {
                Ok(readings) if readings.is_empty() => {
                    debug!(category = %category, "Category unavailable, skipping");
                }
                Ok(readings) => {
                    for reading in readings {
                        let metric_name = format!("{}.{}", category, reading.name);
                        let timestamp = self.clock.now();

                        session.record(DataPoint {
                            timestamp,
                            metric_name: metric_name.clone(),
                            value: reading.value,
                            unit: reading.unit,
                            metadata: HashMap::new(),
                        });
                        self.metrics.inc_samples_collected();

                        let in_window = baseline.observe(iteration, &metric_name, reading.value);
                        if in_window {
                            continue;
                        }
                        if let Some(entry) = baseline.entry(&metric_name) {
                            if let Some(event) =
                                self.detector.evaluate(entry, reading.value, timestamp)
                            {
                                warn!(
                                    metric = %event.metric_name,
                                    observed = event.observed_value,
                                    baseline_mean = event.baseline_mean,
                                    baseline_stddev = event.baseline_stddev,
                                    "Anomaly detected"
                                );
                                self.metrics.inc_anomalies_detected();
                                session.record_anomaly(event.message());
                            }
                        }
                    }
                }
                Err(e) => {
                    // Metric-unavailable is recovered locally, never fatal.
                    debug!(category = %category, error = %e, "Failed to query category, skipping");
                    self.metrics.inc_collection_errors();
                }
            }
        }
    }
}
