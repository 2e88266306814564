//! Per-category setting weight tables and bottleneck adjustments
//!
//! Each workload category maps to a base weight in [0, 1] per tunable
//! setting. Detected bottlenecks apply fixed multiplicative adjustments,
//! after which every weight is re-clamped to [0, 1].

use crate::models::{Bottleneck, TunableSetting, WorkloadCategory};
use std::collections::{BTreeMap, BTreeSet};

/// CPU bottleneck: push boost harder
pub const CPU_BOOST_FACTOR: f64 = 1.15;
/// CPU bottleneck: raise the power ceiling
pub const CPU_POWER_LIMIT_FACTOR: f64 = 1.10;
/// Memory bottleneck: favor the aggressive memory profile
pub const MEMORY_PROFILE_FACTOR: f64 = 1.20;
/// Thermal bottleneck: push cooling harder
pub const THERMAL_COOLING_FACTOR: f64 = 1.25;
/// Thermal bottleneck: back off the power ceiling
pub const THERMAL_POWER_LIMIT_FACTOR: f64 = 0.85;

/// Weight vector over all tunable settings
pub type SettingWeights = BTreeMap<TunableSetting, f64>;

/// Immutable category-to-weights table, built once and shared read-only
pub struct WeightTable {
    table: BTreeMap<WorkloadCategory, SettingWeights>,
}

impl WeightTable {
    /// Construct from an explicit table (categories without an entry fall
    /// back to the General vector)
    pub fn new(table: BTreeMap<WorkloadCategory, SettingWeights>) -> Self {
        Self { table }
    }

    /// Built-in tuning weights for the supported categories
    pub fn builtin() -> Self {
        use TunableSetting::*;
        let mut table = BTreeMap::new();
        table.insert(
            WorkloadCategory::Gaming,
            weights(&[
                (Boost, 0.95),
                (IdleStateDepth, 0.30),
                (Hyperthreading, 0.60),
                (MemoryProfile, 0.85),
                (PowerLimit, 0.90),
                (CoolingCurve, 0.80),
            ]),
        );
        table.insert(
            WorkloadCategory::Rendering,
            weights(&[
                (Boost, 0.90),
                (IdleStateDepth, 0.20),
                (Hyperthreading, 0.95),
                (MemoryProfile, 0.90),
                (PowerLimit, 0.95),
                (CoolingCurve, 0.85),
            ]),
        );
        table.insert(
            WorkloadCategory::Development,
            weights(&[
                (Boost, 0.70),
                (IdleStateDepth, 0.60),
                (Hyperthreading, 0.90),
                (MemoryProfile, 0.70),
                (PowerLimit, 0.65),
                (CoolingCurve, 0.55),
            ]),
        );
        table.insert(
            WorkloadCategory::Scientific,
            weights(&[
                (Boost, 0.85),
                (IdleStateDepth, 0.25),
                (Hyperthreading, 0.95),
                (MemoryProfile, 0.95),
                (PowerLimit, 0.90),
                (CoolingCurve, 0.75),
            ]),
        );
        table.insert(
            WorkloadCategory::General,
            weights(&[
                (Boost, 0.60),
                (IdleStateDepth, 0.70),
                (Hyperthreading, 0.75),
                (MemoryProfile, 0.60),
                (PowerLimit, 0.55),
                (CoolingCurve, 0.50),
            ]),
        );
        Self { table }
    }

    /// Base weight vector for a category, falling back to General
    pub fn weights_for(&self, category: WorkloadCategory) -> SettingWeights {
        self.table
            .get(&category)
            .or_else(|| self.table.get(&WorkloadCategory::General))
            .cloned()
            .unwrap_or_default()
    }
}

fn weights(entries: &[(TunableSetting, f64)]) -> SettingWeights {
    entries.iter().map(|(s, w)| (*s, w.clamp(0.0, 1.0))).collect()
}

/// Apply bottleneck adjustments in place, re-clamping each touched weight
pub fn apply_bottlenecks(weights: &mut SettingWeights, bottlenecks: &BTreeSet<Bottleneck>) {
    for bottleneck in bottlenecks {
        match bottleneck {
            Bottleneck::Cpu => {
                scale(weights, TunableSetting::Boost, CPU_BOOST_FACTOR);
                scale(weights, TunableSetting::PowerLimit, CPU_POWER_LIMIT_FACTOR);
            }
            Bottleneck::Memory => {
                scale(weights, TunableSetting::MemoryProfile, MEMORY_PROFILE_FACTOR);
            }
            Bottleneck::Thermal => {
                scale(weights, TunableSetting::CoolingCurve, THERMAL_COOLING_FACTOR);
                scale(
                    weights,
                    TunableSetting::PowerLimit,
                    THERMAL_POWER_LIMIT_FACTOR,
                );
            }
        }
    }
}

fn scale(weights: &mut SettingWeights, setting: TunableSetting, factor: f64) {
    if let Some(weight) = weights.get_mut(&setting) {
        *weight = (*weight * factor).clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_covers_all_categories_and_settings() {
        let table = WeightTable::builtin();
        for category in WorkloadCategory::ALL {
            let weights = table.weights_for(category);
            for setting in TunableSetting::ALL {
                let w = weights.get(&setting).copied().unwrap_or(-1.0);
                assert!((0.0..=1.0).contains(&w), "{category} {setting}: {w}");
            }
        }
    }

    #[test]
    fn test_thermal_bottleneck_raises_cooling_lowers_power() {
        let table = WeightTable::builtin();
        let base = table.weights_for(WorkloadCategory::Gaming);
        let mut adjusted = base.clone();
        let mut bottlenecks = BTreeSet::new();
        bottlenecks.insert(Bottleneck::Thermal);
        apply_bottlenecks(&mut adjusted, &bottlenecks);

        assert!(
            adjusted[&TunableSetting::CoolingCurve] >= base[&TunableSetting::CoolingCurve]
        );
        assert!(adjusted[&TunableSetting::PowerLimit] < base[&TunableSetting::PowerLimit]);
    }

    #[test]
    fn test_cpu_bottleneck_raises_boost_and_power() {
        let table = WeightTable::builtin();
        let base = table.weights_for(WorkloadCategory::Development);
        let mut adjusted = base.clone();
        let mut bottlenecks = BTreeSet::new();
        bottlenecks.insert(Bottleneck::Cpu);
        apply_bottlenecks(&mut adjusted, &bottlenecks);

        assert!((adjusted[&TunableSetting::Boost] - 0.70 * CPU_BOOST_FACTOR).abs() < 1e-9);
        assert!(
            (adjusted[&TunableSetting::PowerLimit] - 0.65 * CPU_POWER_LIMIT_FACTOR).abs() < 1e-9
        );
    }

    #[test]
    fn test_adjusted_weights_stay_clamped() {
        let table = WeightTable::builtin();
        // Exercise every bottleneck combination
        let all = [Bottleneck::Cpu, Bottleneck::Memory, Bottleneck::Thermal];
        for mask in 0..8u32 {
            let bottlenecks: BTreeSet<Bottleneck> = all
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, b)| *b)
                .collect();
            for category in WorkloadCategory::ALL {
                let mut weights = table.weights_for(category);
                apply_bottlenecks(&mut weights, &bottlenecks);
                for (setting, weight) in &weights {
                    assert!(
                        (0.0..=1.0).contains(weight),
                        "{category} {setting} with {bottlenecks:?}: {weight}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_unknown_category_falls_back_to_general() {
        let table = WeightTable::new(BTreeMap::from([(
            WorkloadCategory::General,
            weights(&[(TunableSetting::Boost, 0.5)]),
        )]));
        let fallback = table.weights_for(WorkloadCategory::Gaming);
        assert!((fallback[&TunableSetting::Boost] - 0.5).abs() < 1e-9);
    }
}
