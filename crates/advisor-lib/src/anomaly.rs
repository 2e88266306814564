//! Sigma-rule anomaly detection
//!
//! Flags post-baseline samples whose distance from the frozen baseline mean
//! exceeds a configurable number of standard deviations. Detection is purely
//! observational: anomalies attach to the session and never abort collection.

use crate::baseline::BaselineEntry;
use crate::models::AnomalyEvent;
use chrono::{DateTime, Utc};

/// Default deviation threshold (3 sigma)
pub const DEFAULT_SIGMA: f64 = 3.0;

/// Flags samples outside the sigma band of their metric's baseline
#[derive(Debug, Clone)]
pub struct SigmaDetector {
    /// Number of standard deviations tolerated before flagging
    pub sigma: f64,
}

impl SigmaDetector {
    pub fn new(sigma: f64) -> Self {
        Self { sigma }
    }

    /// Evaluate one post-baseline sample against its frozen baseline
    ///
    /// Returns `None` when the baseline is non-evaluable (open window or
    /// fewer than 2 samples) or the value stays in band.
    pub fn evaluate(
        &self,
        baseline: &BaselineEntry,
        value: f64,
        timestamp: DateTime<Utc>,
    ) -> Option<AnomalyEvent> {
        if !baseline.is_evaluable() {
            return None;
        }

        if (value - baseline.mean).abs() > self.sigma * baseline.stddev {
            Some(AnomalyEvent {
                metric_name: baseline.metric_name.clone(),
                observed_value: value,
                baseline_mean: baseline.mean,
                baseline_stddev: baseline.stddev,
                sigma: self.sigma,
                timestamp,
            })
        } else {
            None
        }
    }
}

impl Default for SigmaDetector {
    fn default() -> Self {
        Self {
            sigma: DEFAULT_SIGMA,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::BaselineTracker;

    fn frozen_baseline(values: &[f64]) -> BaselineTracker {
        let mut tracker = BaselineTracker::new(values.len() * 5, 0.20);
        for (i, v) in values.iter().enumerate() {
            tracker.observe(i, "CPU.Load", *v);
        }
        // Close the window
        tracker.observe(values.len(), "CPU.Load", values[0]);
        tracker
    }

    #[test]
    fn test_three_sigma_fires_on_large_deviation() {
        // mean 35, stddev 5
        let tracker = frozen_baseline(&[30.0, 40.0]);
        let entry = tracker.entry("CPU.Load").unwrap();

        let detector = SigmaDetector::default();
        let event = detector.evaluate(entry, 98.5, Utc::now());
        assert!(event.is_some());

        let event = event.unwrap();
        assert!((event.baseline_mean - 35.0).abs() < 1e-9);
        assert!((event.baseline_stddev - 5.0).abs() < 1e-9);
        assert!(event.message().contains("CPU.Load"));
    }

    #[test]
    fn test_three_sigma_quiet_within_band() {
        let tracker = frozen_baseline(&[30.0, 40.0]);
        let entry = tracker.entry("CPU.Load").unwrap();

        let detector = SigmaDetector::default();
        // |40 - 35| = 5 <= 3 * 5
        assert!(detector.evaluate(entry, 40.0, Utc::now()).is_none());
        // Exactly on the band edge does not fire
        assert!(detector.evaluate(entry, 50.0, Utc::now()).is_none());
    }

    #[test]
    fn test_non_evaluable_baseline_never_fires() {
        let mut tracker = BaselineTracker::new(10, 0.10);
        tracker.observe(0, "CPU.Load", 35.0);
        tracker.observe(1, "CPU.Load", 99.0);

        let entry = tracker.entry("CPU.Load").unwrap();
        let detector = SigmaDetector::default();
        assert!(detector.evaluate(entry, 99.0, Utc::now()).is_none());
    }

    #[test]
    fn test_identical_baseline_quiet_for_identical_values() {
        let mut tracker = BaselineTracker::new(10, 0.20);
        tracker.observe(0, "CPU.Load", 35.0);
        tracker.observe(1, "CPU.Load", 35.0);
        tracker.observe(2, "CPU.Load", 35.0);

        let entry = tracker.entry("CPU.Load").unwrap();
        let detector = SigmaDetector::default();
        // Identical later values sit exactly on the zero-width band edge
        assert!(detector.evaluate(entry, 35.0, Utc::now()).is_none());
        // A genuine departure from a perfectly flat baseline does fire
        assert!(detector.evaluate(entry, 80.0, Utc::now()).is_some());
    }

    #[test]
    fn test_message_carries_configured_sigma() {
        // mean 35, stddev 5
        let tracker = frozen_baseline(&[30.0, 40.0]);
        let entry = tracker.entry("CPU.Load").unwrap();

        let event = SigmaDetector::new(2.0)
            .evaluate(entry, 60.0, Utc::now())
            .unwrap();
        assert!(event.message().contains("2x"), "message was: {}", event.message());

        let event = SigmaDetector::default()
            .evaluate(entry, 98.5, Utc::now())
            .unwrap();
        assert!(event.message().contains("3x"), "message was: {}", event.message());
    }

    #[test]
    fn test_identical_deviations_render_identical_messages() {
        let tracker = frozen_baseline(&[30.0, 40.0]);
        let entry = tracker.entry("CPU.Load").unwrap();
        let detector = SigmaDetector::default();

        let a = detector.evaluate(entry, 98.5, Utc::now()).unwrap();
        let b = detector.evaluate(entry, 98.5, Utc::now()).unwrap();
        assert_eq!(a.message(), b.message());

        let c = detector.evaluate(entry, 99.5, Utc::now()).unwrap();
        assert_ne!(a.message(), c.message());
    }
}
