//! CLI configuration

use advisor_lib::BottleneckThresholds;
use anyhow::Result;
use serde::Deserialize;

/// Advisor CLI configuration, overridable via `ADVISOR_*` environment
/// variables
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Host name used in structured log events
    #[serde(default = "default_host_name")]
    pub host_name: String,

    /// Default sampling duration in seconds
    #[serde(default = "default_sample_duration")]
    pub sample_duration_secs: u64,

    /// Default sampling interval in seconds
    #[serde(default = "default_sample_interval")]
    pub sample_interval_secs: u64,

    /// Fraction of iterations used for the baseline window
    #[serde(default = "default_baseline_fraction")]
    pub baseline_fraction: f64,

    /// CPU utilization percentage above which CPU counts as bottlenecked
    #[serde(default = "default_cpu_bottleneck")]
    pub cpu_bottleneck_percent: f64,

    /// Available-memory percentage below which memory counts as bottlenecked
    #[serde(default = "default_memory_bottleneck")]
    pub memory_bottleneck_percent: f64,

    /// Peak temperature above which the host counts as thermally bottlenecked
    #[serde(default = "default_thermal_bottleneck")]
    pub thermal_bottleneck_celsius: f64,
}

fn default_host_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string())
}

fn default_sample_duration() -> u64 {
    60
}

fn default_sample_interval() -> u64 {
    5
}

fn default_baseline_fraction() -> f64 {
    0.10
}

fn default_cpu_bottleneck() -> f64 {
    85.0
}

fn default_memory_bottleneck() -> f64 {
    20.0
}

fn default_thermal_bottleneck() -> f64 {
    85.0
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            host_name: default_host_name(),
            sample_duration_secs: default_sample_duration(),
            sample_interval_secs: default_sample_interval(),
            baseline_fraction: default_baseline_fraction(),
            cpu_bottleneck_percent: default_cpu_bottleneck(),
            memory_bottleneck_percent: default_memory_bottleneck(),
            thermal_bottleneck_celsius: default_thermal_bottleneck(),
        }
    }
}

impl CliConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("ADVISOR"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }

    /// Bottleneck thresholds for the recommendation pipeline
    pub fn bottleneck_thresholds(&self) -> BottleneckThresholds {
        BottleneckThresholds {
            cpu_utilization_percent: self.cpu_bottleneck_percent,
            memory_available_percent: self.memory_bottleneck_percent,
            thermal_celsius: self.thermal_bottleneck_celsius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();
        assert_eq!(config.sample_duration_secs, 60);
        assert_eq!(config.sample_interval_secs, 5);
        assert!((config.baseline_fraction - 0.10).abs() < 1e-9);

        let thresholds = config.bottleneck_thresholds();
        assert!((thresholds.cpu_utilization_percent - 85.0).abs() < 1e-9);
        assert!((thresholds.memory_available_percent - 20.0).abs() < 1e-9);
        assert!((thresholds.thermal_celsius - 85.0).abs() < 1e-9);
    }
}
