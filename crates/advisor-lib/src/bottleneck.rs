//! Threshold-driven bottleneck derivation
//!
//! Converts live utilization readings into the bottleneck set consumed by
//! the recommendation scorer. Thresholds are caller-visible configuration,
//! not buried constants.

use crate::models::{Bottleneck, UtilizationSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Utilization thresholds above (or below) which a resource counts as a
/// bottleneck
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BottleneckThresholds {
    /// Sustained CPU utilization above this flags a CPU bottleneck
    pub cpu_utilization_percent: f64,
    /// Available memory below this fraction of total flags a memory bottleneck
    pub memory_available_percent: f64,
    /// Peak sensor reading above this flags a thermal bottleneck
    pub thermal_celsius: f64,
}

impl Default for BottleneckThresholds {
    fn default() -> Self {
        Self {
            cpu_utilization_percent: 85.0,
            memory_available_percent: 20.0,
            thermal_celsius: 85.0,
        }
    }
}

/// Derive the bottleneck set from a utilization snapshot
///
/// A missing thermal reading means no thermal bottleneck, not an error.
pub fn detect_bottlenecks(
    snapshot: &UtilizationSnapshot,
    thresholds: &BottleneckThresholds,
) -> BTreeSet<Bottleneck> {
    let mut bottlenecks = BTreeSet::new();

    if snapshot.cpu_utilization_percent > thresholds.cpu_utilization_percent {
        bottlenecks.insert(Bottleneck::Cpu);
    }
    if snapshot.memory_available_percent < thresholds.memory_available_percent {
        bottlenecks.insert(Bottleneck::Memory);
    }
    if let Some(peak) = snapshot.peak_thermal_celsius {
        if peak > thresholds.thermal_celsius {
            bottlenecks.insert(Bottleneck::Thermal);
        }
    }

    bottlenecks
}
