//! Per-metric baseline statistics
//!
//! Accumulates each metric's values over the leading fraction of a session's
//! iterations, then freezes a reference mean and population standard
//! deviation. Baselines are ephemeral: they live for one session and are
//! discarded with the tracker.

use std::collections::HashMap;

/// Default fraction of iterations used for the baseline window
pub const DEFAULT_BASELINE_FRACTION: f64 = 0.10;

/// Frozen reference statistics for one metric
#[derive(Debug, Clone)]
pub struct BaselineEntry {
    pub metric_name: String,
    /// Values observed inside the baseline window
    pub values: Vec<f64>,
    pub mean: f64,
    pub stddev: f64,
    frozen: bool,
}

impl BaselineEntry {
    fn new(metric_name: &str) -> Self {
        Self {
            metric_name: metric_name.to_string(),
            values: Vec::new(),
            mean: 0.0,
            stddev: 0.0,
            frozen: false,
        }
    }

    /// Compute mean and population stddev once; later calls are no-ops
    fn freeze(&mut self) {
        if self.frozen {
            return;
        }
        let (mean, stddev) = population_stats(&self.values);
        self.mean = mean;
        // Fewer than 2 samples leave stddev at 0, marking the metric
        // non-evaluable rather than creating a zero-width band.
        self.stddev = if self.values.len() >= 2 { stddev } else { 0.0 };
        self.frozen = true;
    }

    /// Whether the anomaly detector may evaluate this metric
    ///
    /// Requires a closed window and at least 2 baseline samples. A zero
    /// stddev from an all-identical window stays evaluable: the strict
    /// band comparison keeps identical later values from firing.
    pub fn is_evaluable(&self) -> bool {
        self.frozen && self.values.len() >= 2
    }

    /// Whether the baseline window for this metric has closed
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

/// Tracks baseline windows for all metrics observed in one session
#[derive(Debug)]
pub struct BaselineTracker {
    baseline_iterations: usize,
    entries: HashMap<String, BaselineEntry>,
}

impl BaselineTracker {
    /// Create a tracker for a session of `total_iterations` iterations
    ///
    /// The window spans the first `ceil(fraction * total_iterations)`
    /// iterations, at least one.
    pub fn new(total_iterations: usize, baseline_fraction: f64) -> Self {
        let fraction = baseline_fraction.clamp(0.0, 1.0);
        let window = (fraction * total_iterations as f64).ceil() as usize;
        Self {
            baseline_iterations: window.max(1),
            entries: HashMap::new(),
        }
    }

    /// Number of leading iterations that feed the baseline
    pub fn baseline_iterations(&self) -> usize {
        self.baseline_iterations
    }

    /// Feed one observation; returns true if it was consumed by the
    /// baseline window (and must not be evaluated for anomalies).
    ///
    /// The first post-window observation of a metric freezes its entry.
    pub fn observe(&mut self, iteration: usize, metric_name: &str, value: f64) -> bool {
        if iteration < self.baseline_iterations {
            self.entries
                .entry(metric_name.to_string())
                .or_insert_with(|| BaselineEntry::new(metric_name))
                .values
                .push(value);
            return true;
        }

        if let Some(entry) = self.entries.get_mut(metric_name) {
            entry.freeze();
        }
        false
    }

    /// Frozen baseline for a metric, if one was established
    pub fn entry(&self, metric_name: &str) -> Option<&BaselineEntry> {
        self.entries.get(metric_name)
    }
}

/// Mean and population standard deviation (`sqrt(avg((x - mean)^2))`)
pub(crate) fn population_stats(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
