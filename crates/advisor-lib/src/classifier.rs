//! Workload classification from software indicators
//!
//! Matches observed names (running processes, installed software) against
//! per-category keyword signatures. Scores accumulate across all indicators
//! and the highest total wins; ties break by category declaration order.

use crate::models::{WorkloadCategory, WorkloadClassification};
use std::collections::BTreeMap;
use tracing::debug;

/// Points added to a category per matching indicator
pub const MATCH_WEIGHT: f64 = 10.0;

/// Score-gap fraction over the runner-up that counts as a dominant win
pub const DOMINANCE_MARGIN_FLOOR: f64 = 0.60;

/// A named keyword set identifying one workload category
///
/// Static configuration: built once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct WorkloadSignature {
    pub category: WorkloadCategory,
    /// Lowercase substrings matched against lowercased indicator names
    pub keywords: Vec<&'static str>,
}

/// Built-in signature set covering the supported categories
pub fn default_signatures() -> Vec<WorkloadSignature> {
    vec![
        WorkloadSignature {
            category: WorkloadCategory::Gaming,
            keywords: vec![
                "steam", "epicgames", "battle.net", "riotclient", "origin", "goggalaxy",
                "xboxapp", "msfs", "easyanticheat",
            ],
        },
        WorkloadSignature {
            category: WorkloadCategory::Rendering,
            keywords: vec![
                "blender", "maya", "3dsmax", "cinema4d", "houdini", "unrealeditor",
                "resolve", "premiere", "afterfx", "keyshot",
            ],
        },
        WorkloadSignature {
            category: WorkloadCategory::Development,
            keywords: vec![
                "code", "devenv", "idea64", "pycharm", "rider", "clion", "cargo", "rustc",
                "docker", "node", "gcc", "clang",
            ],
        },
        WorkloadSignature {
            category: WorkloadCategory::Scientific,
            keywords: vec![
                "matlab", "mathematica", "jupyter", "rstudio", "octave", "ansys", "comsol",
                "labview", "spyder",
            ],
        },
    ]
}

/// Shared confidence computation for classification consumers
///
/// One model serves both the classifier itself and the recommendation
/// scorer: a base score, a fixed bonus for a dominant category win, a
/// contribution proportional to hardware-fact completeness, and a penalty
/// when no indicators were available. Output is clamped to [0, 1].
#[derive(Debug, Clone)]
pub struct ConfidenceModel {
    pub base: f64,
    pub dominance_bonus: f64,
    pub completeness_weight: f64,
    pub no_evidence_penalty: f64,
}

impl ConfidenceModel {
    pub fn confidence(
        &self,
        hardware_completeness: f64,
        dominance_margin: f64,
        has_indicators: bool,
    ) -> f64 {
        let mut confidence = self.base;
        if dominance_margin >= DOMINANCE_MARGIN_FLOOR {
            confidence += self.dominance_bonus;
        }
        confidence += self.completeness_weight * hardware_completeness.clamp(0.0, 1.0);
        if !has_indicators {
            confidence -= self.no_evidence_penalty;
        }
        confidence.clamp(0.0, 1.0)
    }
}

impl Default for ConfidenceModel {
    fn default() -> Self {
        Self {
            base: 0.50,
            dominance_bonus: 0.20,
            completeness_weight: 0.20,
            no_evidence_penalty: 0.25,
        }
    }
}

/// Classifies indicator names into a workload category
pub struct WorkloadClassifier {
    signatures: Vec<WorkloadSignature>,
    confidence_model: ConfidenceModel,
}

impl WorkloadClassifier {
    /// Create a classifier over an injected signature set
    pub fn new(signatures: Vec<WorkloadSignature>, confidence_model: ConfidenceModel) -> Self {
        Self {
            signatures,
            confidence_model,
        }
    }

    /// Classify using accumulate-then-pick-max over all indicators
    ///
    /// Each indicator adds a fixed point value to every category whose
    /// signature it matches (case-insensitive substring). The category with
    /// the highest total wins; ties break by `WorkloadCategory` declaration
    /// order. No match at all falls back to `General` with reduced
    /// confidence.
    pub fn classify(&self, indicators: &[String]) -> WorkloadClassification {
        let mut scores: BTreeMap<WorkloadCategory, f64> = BTreeMap::new();
        let mut matched_indicators: Vec<String> = Vec::new();

        for indicator in indicators {
            let lowered = indicator.to_lowercase();
            let mut matched = false;
            for signature in &self.signatures {
                if signature.keywords.iter().any(|kw| lowered.contains(kw)) {
                    *scores.entry(signature.category).or_insert(0.0) += MATCH_WEIGHT;
                    matched = true;
                }
            }
            if matched {
                matched_indicators.push(indicator.clone());
            }
        }

        let winner = WorkloadCategory::ALL
            .iter()
            .filter_map(|cat| scores.get(cat).map(|s| (*cat, *s)))
            .fold(None::<(WorkloadCategory, f64)>, |best, (cat, score)| {
                match best {
                    // Strict comparison keeps the earliest-declared category on ties
                    Some((_, best_score)) if score > best_score => Some((cat, score)),
                    Some(best) => Some(best),
                    None => Some((cat, score)),
                }
            });

        match winner {
            Some((category, best_score)) if best_score > 0.0 => {
                let margin = dominance_margin(&scores, category, best_score);
                let confidence =
                    self.confidence_model
                        .confidence(0.0, margin, !indicators.is_empty());
                debug!(
                    category = %category,
                    score = best_score,
                    margin,
                    matched = matched_indicators.len(),
                    "Workload classified"
                );
                WorkloadClassification {
                    category,
                    scores,
                    matched_indicators,
                    confidence,
                }
            }
            _ => {
                debug!(
                    indicators = indicators.len(),
                    "No signature matched, defaulting to General"
                );
                let confidence = self.confidence_model.confidence(0.0, 0.0, false);
                WorkloadClassification::general(confidence)
            }
        }
    }

    pub fn confidence_model(&self) -> &ConfidenceModel {
        &self.confidence_model
    }
}

impl Default for WorkloadClassifier {
    fn default() -> Self {
        Self::new(default_signatures(), ConfidenceModel::default())
    }
}

/// Fractional score gap between the winner and the runner-up
pub fn dominance_margin(
    scores: &BTreeMap<WorkloadCategory, f64>,
    winner: WorkloadCategory,
    winner_score: f64,
) -> f64 {
    if winner_score <= 0.0 {
        return 0.0;
    }
    let runner_up = scores
        .iter()
        .filter(|(cat, _)| **cat != winner)
        .map(|(_, s)| *s)
        .fold(0.0, f64::max);
    (winner_score - runner_up) / winner_score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicators(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_accumulation_picks_highest_total() {
        let classifier = WorkloadClassifier::default();
        let result = classifier.classify(&indicators(&[
            "steam.exe",
            "steamwebhelper.exe",
            "code.exe",
        ]));

        assert_eq!(result.category, WorkloadCategory::Gaming);
        assert_eq!(result.scores[&WorkloadCategory::Gaming], 2.0 * MATCH_WEIGHT);
        assert_eq!(result.scores[&WorkloadCategory::Development], MATCH_WEIGHT);
        assert_eq!(result.matched_indicators.len(), 3);
    }

    #[test]
    fn test_tie_breaks_by_declaration_order() {
        let classifier = WorkloadClassifier::default();
        // One Gaming match, one Development match: equal totals
        let result = classifier.classify(&indicators(&["steam.exe", "code.exe"]));

        assert_eq!(result.scores[&WorkloadCategory::Gaming], MATCH_WEIGHT);
        assert_eq!(result.scores[&WorkloadCategory::Development], MATCH_WEIGHT);
        // Gaming is declared before Development
        assert_eq!(result.category, WorkloadCategory::Gaming);
    }

    #[test]
    fn test_no_match_defaults_to_general() {
        let classifier = WorkloadClassifier::default();
        let result = classifier.classify(&indicators(&["explorer.exe", "svchost.exe"]));

        assert_eq!(result.category, WorkloadCategory::General);
        assert!(result.matched_indicators.is_empty());
        // Reduced confidence: base minus the no-evidence penalty
        assert!(result.confidence < ConfidenceModel::default().base);
    }

    #[test]
    fn test_empty_indicator_list() {
        let classifier = WorkloadClassifier::default();
        let result = classifier.classify(&[]);
        assert_eq!(result.category, WorkloadCategory::General);
        assert!(result.confidence >= 0.0 && result.confidence <= 1.0);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let classifier = WorkloadClassifier::default();
        let result = classifier.classify(&indicators(&["Steam.EXE", "BLENDER"]));
        assert!(result.scores.contains_key(&WorkloadCategory::Gaming));
        assert!(result.scores.contains_key(&WorkloadCategory::Rendering));
    }

    #[test]
    fn test_dominant_win_earns_confidence_bonus() {
        let classifier = WorkloadClassifier::default();
        let dominant = classifier.classify(&indicators(&[
            "steam.exe",
            "epicgameslauncher.exe",
            "battle.net.exe",
        ]));
        let contested = classifier.classify(&indicators(&["steam.exe", "code.exe"]));
        assert!(dominant.confidence > contested.confidence);
    }

    #[test]
    fn test_confidence_always_clamped() {
        let model = ConfidenceModel {
            base: 0.9,
            dominance_bonus: 0.5,
            completeness_weight: 0.5,
            no_evidence_penalty: 2.0,
        };
        assert!(model.confidence(1.0, 1.0, true) <= 1.0);
        assert!(model.confidence(0.0, 0.0, false) >= 0.0);
    }

    #[test]
    fn test_dominance_margin_math() {
        let mut scores = BTreeMap::new();
        scores.insert(WorkloadCategory::Gaming, 30.0);
        scores.insert(WorkloadCategory::Development, 10.0);
        let margin = dominance_margin(&scores, WorkloadCategory::Gaming, 30.0);
        assert!((margin - 2.0 / 3.0).abs() < 1e-9);

        // Sole category has full dominance
        let mut solo = BTreeMap::new();
        solo.insert(WorkloadCategory::Scientific, 20.0);
        assert!((dominance_margin(&solo, WorkloadCategory::Scientific, 20.0) - 1.0).abs() < 1e-9);
    }
}
