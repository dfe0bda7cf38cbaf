//! Question analysis: which tier the question itself points at.

use serde::{Deserialize, Serialize};
use tracing::debug;

use granula_core::constants::REPEAT_FAILURE_LIMIT;
use granula_core::models::{GranularityHistory, TierId, TierLadder};
use granula_routing::normalize::normalize;

use crate::lexicon::DomainLexicon;
use crate::patterns::{PatternCounts, PatternFamily};

/// Confidence with no pattern signal at all.
const BASE_CONFIDENCE: f64 = 0.5;
/// Confidence with no pattern signal but a clearly domain-specific question.
const DOMAIN_ONLY_CONFIDENCE: f64 = 0.6;
/// Domain score needed for [`DOMAIN_ONLY_CONFIDENCE`].
const DOMAIN_ONLY_MIN_SCORE: usize = 3;
/// Domain score needed for the pattern-branch bonus.
const DOMAIN_BONUS_MIN_SCORE: usize = 2;
const DOMAIN_BONUS: f64 = 0.1;
/// Penalty once every tier has been tried.
const EXHAUSTED_PENALTY: f64 = 0.1;

/// Analyzer output for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GranularityAnalysis {
    pub recommended: TierId,
    /// In [0, 1].
    pub confidence: f64,
    pub rationale: String,
    pub counts: PatternCounts,
    pub domain_score: usize,
}

impl GranularityAnalysis {
    pub fn dominant_family(&self) -> Option<PatternFamily> {
        self.counts.dominant()
    }
}

/// Scores a question against the pattern families and the domain lexicon.
#[derive(Debug, Clone)]
pub struct GranularityAnalyzer {
    ladder: TierLadder,
    lexicon: DomainLexicon,
}

impl GranularityAnalyzer {
    pub fn new(ladder: TierLadder, lexicon: DomainLexicon) -> Self {
        Self { ladder, lexicon }
    }

    pub fn ladder(&self) -> &TierLadder {
        &self.ladder
    }

    /// Tier a pattern family points at.
    pub fn tier_for(&self, family: Option<PatternFamily>) -> TierId {
        match family {
            Some(PatternFamily::Specific) => self.ladder.finest(),
            Some(PatternFamily::Broad) => self.ladder.coarsest(),
            Some(PatternFamily::Analytical) | None => self.ladder.medium(),
        }
    }

    pub fn analyze(&self, question: &str, history: &GranularityHistory) -> GranularityAnalysis {
        let text = normalize(question);
        let counts = PatternCounts::count(&text);
        let domain_score = self.lexicon.score(&text);

        let (mut recommended, mut confidence, mut rationale) = if counts.total() == 0 {
            let confidence = if domain_score >= DOMAIN_ONLY_MIN_SCORE {
                DOMAIN_ONLY_CONFIDENCE
            } else {
                BASE_CONFIDENCE
            };
            (
                self.ladder.medium(),
                confidence,
                format!("no pattern signal, domain score {domain_score}"),
            )
        } else {
            let dominant = counts.dominant();
            let mut confidence = counts.leading() as f64 / (counts.total() + 1) as f64;
            if domain_score >= DOMAIN_BONUS_MIN_SCORE {
                confidence += DOMAIN_BONUS;
            }
            let label = match dominant {
                Some(PatternFamily::Specific) => "specific indicators dominate",
                Some(PatternFamily::Analytical) => "analytical indicators dominate",
                Some(PatternFamily::Broad) => "broad indicators dominate",
                None => "mixed indicators",
            };
            (
                self.tier_for(dominant),
                confidence.min(1.0),
                format!(
                    "{label} (specific={}, analytical={}, broad={}, domain={domain_score})",
                    counts.specific, counts.analytical, counts.broad
                ),
            )
        };

        if self.ladder.ids().all(|t| history.contains_tier(&t)) {
            confidence -= EXHAUSTED_PENALTY;
            rationale.push_str("; every tier already tried");
        }
        confidence = confidence.clamp(0.0, 1.0);

        if history.failures(&recommended) >= REPEAT_FAILURE_LIMIT {
            if let Some(alternative) = self.least_failed_alternative(&recommended, history) {
                rationale.push_str(&format!(
                    "; {recommended} failed {} times, using {alternative}",
                    history.failures(&recommended)
                ));
                recommended = alternative;
            }
        }

        debug!(
            tier = %recommended,
            confidence,
            specific = counts.specific,
            analytical = counts.analytical,
            broad = counts.broad,
            domain_score,
            "granularity analyzed"
        );

        GranularityAnalysis {
            recommended,
            confidence,
            rationale,
            counts,
            domain_score,
        }
    }

    /// Tier other than `avoid` with the fewest recorded failures, finest first on ties.
    fn least_failed_alternative(
        &self,
        avoid: &TierId,
        history: &GranularityHistory,
    ) -> Option<TierId> {
        self.ladder
            .others(avoid)
            .min_by_key(|t| history.failures(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use granula_core::config::GranularityConfig;
    use granula_core::models::{EvaluationScores, HistoryEntry};

    fn analyzer() -> GranularityAnalyzer {
        let ladder = TierLadder::new(&GranularityConfig::default().tiers).unwrap();
        let lexicon = DomainLexicon::new(
            vec!["student enrollment".into()],
            vec!["enrolled students".into(), "credits".into()],
            vec!["academic year".into(), "degree".into(), "faculty".into()],
            vec!["ects".into()],
        );
        GranularityAnalyzer::new(ladder, lexicon)
    }

    fn failed(tier: &str, attempt: u32) -> HistoryEntry {
        HistoryEntry {
            tier: tier.into(),
            attempt,
            evaluation: EvaluationScores::zero(),
            success: false,
        }
    }

    #[test]
    fn no_signal_is_medium_half_confidence() {
        let a = analyzer().analyze("Tell me something", &GranularityHistory::default());
        assert_eq!(a.recommended.as_str(), "medium");
        assert_eq!(a.confidence, 0.5);
    }

    #[test]
    fn domain_only_question_gets_higher_confidence() {
        let a = analyzer().analyze(
            "enrolled students academic year degree faculty",
            &GranularityHistory::default(),
        );
        assert_eq!(a.counts.total(), 0);
        assert!(a.domain_score >= 3);
        assert_eq!(a.recommended.as_str(), "medium");
        assert_eq!(a.confidence, 0.6);
    }

    #[test]
    fn three_specific_hits_with_domain_pick_finest() {
        // exact, how many, 2023 + four lexicon terms.
        let a = analyzer().analyze(
            "Exactly how many enrolled students per degree and faculty in the academic year 2023?",
            &GranularityHistory::default(),
        );
        assert_eq!(a.counts.specific, 3);
        assert_eq!(a.domain_score, 4);
        assert_eq!(a.recommended.as_str(), "fine");
        assert!((a.confidence - 0.85).abs() < 1e-9);
    }

    #[test]
    fn tie_between_families_is_medium() {
        let a = analyzer().analyze("how many, give an overview", &GranularityHistory::default());
        assert_eq!(a.counts.specific, 1);
        assert_eq!(a.counts.broad, 1);
        assert_eq!(a.recommended.as_str(), "medium");
    }

    #[test]
    fn leading_family_without_majority_is_medium() {
        let a = analyzer().analyze(
            "how many in 2023, why, give an overview",
            &GranularityHistory::default(),
        );
        assert_eq!(a.counts, PatternCounts { specific: 2, analytical: 1, broad: 1 });
        assert_eq!(a.recommended.as_str(), "medium");
        assert!((a.confidence - 0.4).abs() < 1e-9);
        assert!(a.rationale.starts_with("mixed indicators"));
    }

    #[test]
    fn exhausted_history_lowers_confidence() {
        let mut h = GranularityHistory::new(5);
        h.record(failed("fine", 0));
        h.record(failed("medium", 1));
        h.record(failed("coarse", 2));
        let a = analyzer().analyze("Tell me something", &h);
        assert!((a.confidence - 0.4).abs() < 1e-9);
    }

    #[test]
    fn repeatedly_failed_recommendation_is_replaced() {
        let mut h = GranularityHistory::new(5);
        h.record(failed("medium", 0));
        h.record(failed("medium", 1));
        h.record(failed("coarse", 2));
        let a = analyzer().analyze("Tell me something", &h);
        assert_eq!(a.recommended.as_str(), "fine");
        assert!(a.rationale.contains("failed 2 times"));
    }
}
