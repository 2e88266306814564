//! Recommendation scoring engine
//!
//! Combines hardware facts, detected bottlenecks, and the classified
//! workload category against a per-category weight table to produce
//! per-setting recommendations with confidence and risk. Scoring is pure
//! and stateless beyond the injected read-only tables, and it never fails:
//! incomplete inputs degrade to neutral defaults.

mod output;
mod weights;

pub use output::{
    action_for, build_reasoning, expected_gain_percent, risk_for, round1,
    CONSERVATIVE_THRESHOLD, ENABLE_THRESHOLD, GAIN_PER_BOTTLENECK, MAXIMIZE_THRESHOLD,
    MEDIUM_HIGH_RISK_THRESHOLD, MEDIUM_RISK_THRESHOLD, MODERATE_THRESHOLD,
};
pub use weights::{
    apply_bottlenecks, SettingWeights, WeightTable, CPU_BOOST_FACTOR, CPU_POWER_LIMIT_FACTOR,
    MEMORY_PROFILE_FACTOR, THERMAL_COOLING_FACTOR, THERMAL_POWER_LIMIT_FACTOR,
};

use crate::classifier::{dominance_margin, ConfidenceModel};
use crate::models::{
    HardwareFacts, RecommendationResult, SettingRecommendation, WorkloadClassification,
};
use std::collections::BTreeMap;
use tracing::info;

/// Scores tuning recommendations for a classified workload
pub struct Scorer {
    weight_table: WeightTable,
    confidence_model: ConfidenceModel,
}

impl Scorer {
    /// Create a scorer over injected immutable tables
    pub fn new(weight_table: WeightTable, confidence_model: ConfidenceModel) -> Self {
        Self {
            weight_table,
            confidence_model,
        }
    }

    /// Produce a best-effort recommendation; never errors
    pub fn score(
        &self,
        facts: &HardwareFacts,
        classification: &WorkloadClassification,
    ) -> RecommendationResult {
        let category = classification.category;

        let mut weights = self.weight_table.weights_for(category);
        apply_bottlenecks(&mut weights, &facts.bottlenecks);

        let settings: BTreeMap<_, _> = weights
            .iter()
            .map(|(setting, weight)| {
                (
                    *setting,
                    SettingRecommendation {
                        action: action_for(*weight),
                        score: *weight,
                        confidence_percent: round1(weight * 100.0),
                    },
                )
            })
            .collect();

        let mean_weight = if weights.is_empty() {
            0.0
        } else {
            weights.values().sum::<f64>() / weights.len() as f64
        };
        let risk_level = risk_for(mean_weight);

        let expected_gain = expected_gain_percent(category, facts.bottlenecks.len());

        let winner_score = classification
            .scores
            .get(&category)
            .copied()
            .unwrap_or(0.0);
        let margin = dominance_margin(&classification.scores, category, winner_score);
        let confidence = self.confidence_model.confidence(
            facts.completeness(),
            margin,
            !classification.matched_indicators.is_empty(),
        );

        let reasoning = build_reasoning(category, expected_gain, confidence, facts, risk_level);

        info!(
            category = %category,
            confidence,
            expected_gain_percent = expected_gain,
            risk = %risk_level,
            bottlenecks = facts.bottlenecks.len(),
            "Recommendation scored"
        );

        RecommendationResult {
            workload_category: category,
            confidence,
            expected_gain_percent: expected_gain,
            risk_level,
            settings,
            reasoning,
        }
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(WeightTable::builtin(), ConfidenceModel::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bottleneck, SettingAction, TunableSetting, WorkloadCategory};
    use std::collections::BTreeSet;

    fn gaming_classification() -> WorkloadClassification {
        let mut scores = BTreeMap::new();
        scores.insert(WorkloadCategory::Gaming, 30.0);
        WorkloadClassification {
            category: WorkloadCategory::Gaming,
            scores,
            matched_indicators: vec!["steam.exe".to_string()],
            confidence: 0.7,
        }
    }

    #[test]
    fn test_thermal_gaming_scenario() {
        let scorer = Scorer::default();
        let mut facts = HardwareFacts {
            cpu_cores: Some(8),
            ..HardwareFacts::default()
        };
        facts.bottlenecks.insert(Bottleneck::Thermal);

        let result = scorer.score(&facts, &gaming_classification());

        let cooling = &result.settings[&TunableSetting::CoolingCurve];
        assert!(
            cooling.action == SettingAction::Enable || cooling.action == SettingAction::Maximize,
            "cooling action was {:?}",
            cooling.action
        );

        // Power limit weakened versus the unadjusted Gaming baseline
        let baseline = WeightTable::builtin().weights_for(WorkloadCategory::Gaming);
        let power = &result.settings[&TunableSetting::PowerLimit];
        assert!(power.score < baseline[&TunableSetting::PowerLimit]);
    }

    #[test]
    fn test_all_scores_clamped_for_every_combination() {
        let scorer = Scorer::default();
        let all = [Bottleneck::Cpu, Bottleneck::Memory, Bottleneck::Thermal];
        for category in WorkloadCategory::ALL {
            let mut scores = BTreeMap::new();
            scores.insert(category, 20.0);
            let classification = WorkloadClassification {
                category,
                scores,
                matched_indicators: vec!["x".to_string()],
                confidence: 0.6,
            };
            for mask in 0..8u32 {
                let bottlenecks: BTreeSet<Bottleneck> = all
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, b)| *b)
                    .collect();
                let facts = HardwareFacts {
                    bottlenecks,
                    ..HardwareFacts::default()
                };
                let result = scorer.score(&facts, &classification);
                for rec in result.settings.values() {
                    assert!((0.0..=1.0).contains(&rec.score));
                }
                assert!((0.0..=1.0).contains(&result.confidence));
            }
        }
    }

    #[test]
    fn test_incomplete_facts_still_produce_result() {
        let scorer = Scorer::default();
        let result = scorer.score(
            &HardwareFacts::default(),
            &WorkloadClassification::general(0.3),
        );
        assert_eq!(result.workload_category, WorkloadCategory::General);
        assert_eq!(result.settings.len(), TunableSetting::ALL.len());
        assert_eq!(result.reasoning.len(), 5);
    }

    #[test]
    fn test_complete_facts_raise_confidence() {
        let scorer = Scorer::default();
        let classification = gaming_classification();

        let sparse = scorer.score(&HardwareFacts::default(), &classification);
        let full = scorer.score(
            &HardwareFacts {
                cpu_cores: Some(8),
                cpu_threads: Some(16),
                cpu_max_clock_mhz: Some(4800),
                has_dedicated_gpu: Some(true),
                total_ram_gb: Some(32.0),
                bottlenecks: BTreeSet::new(),
            },
            &classification,
        );
        assert!(full.confidence > sparse.confidence);
    }

    #[test]
    fn test_confidence_percent_rounded_to_one_decimal() {
        let scorer = Scorer::default();
        let result = scorer.score(&HardwareFacts::default(), &gaming_classification());
        for rec in result.settings.values() {
            let scaled = rec.confidence_percent * 10.0;
            assert!((scaled - scaled.round()).abs() < 1e-9);
            assert!((rec.confidence_percent - round1(rec.score * 100.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_reasoning_order_is_stable() {
        let scorer = Scorer::default();
        let mut facts = HardwareFacts::default();
        facts.bottlenecks.insert(Bottleneck::Cpu);
        let result = scorer.score(&facts, &gaming_classification());

        assert!(result.reasoning[0].contains("Gaming"));
        assert!(result.reasoning[1].contains("gain"));
        assert!(result.reasoning[2].contains("confidence"));
        assert!(result.reasoning[3].contains("CPU"));
        assert!(result.reasoning[4].starts_with("Risk level"));
    }

    #[test]
    fn test_result_serializes_to_json() {
        let scorer = Scorer::default();
        let result = scorer.score(&HardwareFacts::default(), &gaming_classification());
        let json = serde_json::to_string_pretty(&result).unwrap();
        let back: RecommendationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.workload_category, WorkloadCategory::Gaming);
        assert_eq!(back.settings.len(), result.settings.len());
    }
}
