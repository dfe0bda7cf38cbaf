//! Tier-selection rules, in priority order.
//!
//! Each rule proposes a tier or nothing. The controller takes the first
//! proposal, even when it is the current tier: moving past either end of
//! the ladder stays at that end.

use serde::{Deserialize, Serialize};

use granula_core::config::EvaluationThresholds;
use granula_core::constants::{HIGH_CONFIDENCE_THRESHOLD, RECENT_TIER_WINDOW};
use granula_core::models::{
    EvaluationDimension, EvaluationScores, GranularityHistory, TierId, TierLadder,
};

use crate::analyzer::GranularityAnalysis;
use crate::patterns::PatternFamily;

/// Which rule produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerRule {
    /// Confident analyzer recommendation not tried recently.
    HighConfidence,
    /// Failing evaluation dimension points one way.
    MetricDiagnosis,
    /// Only one configured tier remains untried among the last two.
    Exploration,
    /// Nothing else applied.
    Fallback,
    /// Only one tier is configured.
    SingleTier,
}

impl ControllerRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighConfidence => "high_confidence",
            Self::MetricDiagnosis => "metric_diagnosis",
            Self::Exploration => "exploration",
            Self::Fallback => "fallback",
            Self::SingleTier => "single_tier",
        }
    }
}

/// Everything a rule may look at.
pub struct RuleContext<'a> {
    pub ladder: &'a TierLadder,
    pub current: &'a TierId,
    pub scores: &'a EvaluationScores,
    pub thresholds: &'a EvaluationThresholds,
    pub analysis: &'a GranularityAnalysis,
    pub history: &'a GranularityHistory,
}

impl RuleContext<'_> {
    fn below(&self, dimension: EvaluationDimension) -> bool {
        !self.scores.meets(dimension, self.thresholds)
    }
}

type RuleFn = fn(&RuleContext<'_>) -> Option<TierId>;

/// History entries the exploration rule looks at.
const RECENT_PAIR: usize = 2;

/// Rules in evaluation order.
pub fn all_rules() -> [(ControllerRule, RuleFn); 4] {
    [
        (ControllerRule::HighConfidence, high_confidence as RuleFn),
        (ControllerRule::MetricDiagnosis, metric_diagnosis as RuleFn),
        (ControllerRule::Exploration, exploration as RuleFn),
        (ControllerRule::Fallback, fallback as RuleFn),
    ]
}

/// Adopt a confident recommendation unless it was among the recent attempts.
pub fn high_confidence(ctx: &RuleContext<'_>) -> Option<TierId> {
    let rec = &ctx.analysis.recommended;
    if ctx.analysis.confidence <= HIGH_CONFIDENCE_THRESHOLD || rec == ctx.current {
        return None;
    }
    if ctx.history.recent_tiers(RECENT_TIER_WINDOW).contains(&rec) {
        return None;
    }
    Some(rec.clone())
}

/// Move according to the failing dimension.
///
/// Low recall means context is missing: go coarser. Low precision or
/// faithfulness means too much noise: go finer. Low relevance follows the
/// question's pattern family.
pub fn metric_diagnosis(ctx: &RuleContext<'_>) -> Option<TierId> {
    if ctx.below(EvaluationDimension::ContextRecall) {
        return Some(ctx.ladder.coarser(ctx.current));
    }
    if ctx.below(EvaluationDimension::ContextPrecision)
        || ctx.below(EvaluationDimension::Faithfulness)
    {
        return Some(ctx.ladder.finer(ctx.current));
    }
    if ctx.below(EvaluationDimension::AnswerRelevance) {
        let counts = &ctx.analysis.counts;
        if counts.broad > 0 || counts.specific > 0 {
            return Some(if counts.broad >= counts.specific {
                ctx.ladder.coarsest()
            } else {
                ctx.ladder.finest()
            });
        }
        if counts.analytical > 0 {
            return Some(ctx.ladder.medium());
        }
    }
    None
}

/// When the last two tiers tried leave exactly one tier untried, try it.
pub fn exploration(ctx: &RuleContext<'_>) -> Option<TierId> {
    let recent = ctx.history.recent_tiers(RECENT_PAIR);
    if recent.len() < RECENT_PAIR {
        return None;
    }
    let mut remaining = ctx.ladder.ids().filter(|t| !recent.contains(&t));
    match (remaining.next(), remaining.next()) {
        (Some(t), None) => Some(t),
        _ => None,
    }
}

/// The recommendation if it differs from the current tier, otherwise the
/// non-current tier closest to what the dominant family wants, otherwise the
/// first non-current tier.
pub fn fallback(ctx: &RuleContext<'_>) -> Option<TierId> {
    if &ctx.analysis.recommended != ctx.current {
        return Some(ctx.analysis.recommended.clone());
    }
    let target = match ctx.analysis.dominant_family() {
        Some(PatternFamily::Specific) => Some(0),
        Some(PatternFamily::Broad) => Some(ctx.ladder.len() - 1),
        Some(PatternFamily::Analytical) => Some((ctx.ladder.len() - 1) / 2),
        None => None,
    };
    if let Some(target) = target {
        let best = ctx.ladder.others(ctx.current).min_by_key(|t| {
            ctx.ladder
                .position(t)
                .map_or(usize::MAX, |i| i.abs_diff(target))
        });
        if best.is_some() {
            return best;
        }
    }
    ctx.ladder.others(ctx.current).next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use granula_core::config::GranularityConfig;
    use granula_core::models::HistoryEntry;

    use crate::patterns::PatternCounts;

    fn ladder() -> TierLadder {
        TierLadder::new(&GranularityConfig::default().tiers).unwrap()
    }

    fn analysis(recommended: &str, confidence: f64, counts: PatternCounts) -> GranularityAnalysis {
        GranularityAnalysis {
            recommended: recommended.into(),
            confidence,
            rationale: String::new(),
            counts,
            domain_score: 0,
        }
    }

    fn history(tiers: &[&str]) -> GranularityHistory {
        let mut h = GranularityHistory::new(5);
        for (i, t) in tiers.iter().enumerate() {
            h.record(HistoryEntry {
                tier: (*t).into(),
                attempt: i as u32,
                evaluation: EvaluationScores::zero(),
                success: false,
            });
        }
        h
    }

    fn run(
        rule: RuleFn,
        current: &str,
        scores: EvaluationScores,
        a: &GranularityAnalysis,
        h: &GranularityHistory,
    ) -> Option<TierId> {
        let ladder = ladder();
        let current = TierId::from(current);
        let thresholds = EvaluationThresholds::default();
        rule(&RuleContext {
            ladder: &ladder,
            current: &current,
            scores: &scores,
            thresholds: &thresholds,
            analysis: a,
            history: h,
        })
    }

    const PASSING: EvaluationScores = EvaluationScores {
        faithfulness: 0.9,
        context_precision: 0.9,
        context_recall: 0.9,
        answer_relevance: 0.9,
    };

    #[test]
    fn high_confidence_adopts_fresh_recommendation() {
        let a = analysis("fine", 0.85, PatternCounts::default());
        let got = run(high_confidence, "medium", PASSING, &a, &history(&["medium"]));
        assert_eq!(got, Some("fine".into()));
    }

    #[test]
    fn high_confidence_skips_recently_tried_tier() {
        let a = analysis("fine", 0.85, PatternCounts::default());
        let got = run(high_confidence, "medium", PASSING, &a, &history(&["fine", "medium"]));
        assert_eq!(got, None);
    }

    #[test]
    fn high_confidence_needs_strictly_more_than_threshold() {
        let a = analysis("fine", 0.75, PatternCounts::default());
        assert_eq!(run(high_confidence, "medium", PASSING, &a, &history(&[])), None);
    }

    #[test]
    fn low_recall_goes_coarser() {
        let a = analysis("medium", 0.5, PatternCounts::default());
        let scores = EvaluationScores::new(0.9, 0.9, 0.4, 0.9);
        assert_eq!(
            run(metric_diagnosis, "medium", scores, &a, &history(&[])),
            Some("coarse".into())
        );
    }

    #[test]
    fn low_precision_goes_finer() {
        let a = analysis("medium", 0.5, PatternCounts::default());
        let scores = EvaluationScores::new(0.9, 0.5, 0.9, 0.9);
        assert_eq!(
            run(metric_diagnosis, "coarse", scores, &a, &history(&[])),
            Some("medium".into())
        );
    }

    #[test]
    fn low_relevance_follows_pattern_family() {
        let scores = EvaluationScores::new(0.9, 0.9, 0.9, 0.3);
        let broad = analysis("coarse", 0.5, PatternCounts { specific: 1, analytical: 0, broad: 1 });
        assert_eq!(
            run(metric_diagnosis, "medium", scores, &broad, &history(&[])),
            Some("coarse".into())
        );
        let specific = analysis("fine", 0.5, PatternCounts { specific: 2, analytical: 0, broad: 1 });
        assert_eq!(
            run(metric_diagnosis, "medium", scores, &specific, &history(&[])),
            Some("fine".into())
        );
        let analytical = analysis("medium", 0.5, PatternCounts { specific: 0, analytical: 2, broad: 0 });
        assert_eq!(
            run(metric_diagnosis, "fine", scores, &analytical, &history(&[])),
            Some("medium".into())
        );
    }

    #[test]
    fn no_failing_dimension_means_no_diagnosis() {
        let a = analysis("medium", 0.5, PatternCounts::default());
        assert_eq!(run(metric_diagnosis, "medium", PASSING, &a, &history(&[])), None);
    }

    #[test]
    fn exploration_picks_the_untried_tier() {
        let a = analysis("medium", 0.5, PatternCounts::default());
        let h = history(&["fine", "fine", "coarse"]);
        assert_eq!(run(exploration, "coarse", PASSING, &a, &h), Some("medium".into()));
    }

    #[test]
    fn exploration_ignores_older_tiers() {
        // Only the last two entries count: coarse twice covers one tier.
        let a = analysis("medium", 0.5, PatternCounts::default());
        let h = history(&["fine", "coarse", "coarse"]);
        assert_eq!(run(exploration, "coarse", PASSING, &a, &h), None);
    }

    #[test]
    fn exploration_needs_two_attempts() {
        let a = analysis("medium", 0.5, PatternCounts::default());
        assert_eq!(run(exploration, "fine", PASSING, &a, &history(&["fine"])), None);
    }

    #[test]
    fn diagnosis_at_either_end_stays_put() {
        let a = analysis("medium", 0.5, PatternCounts::default());
        let low_recall = EvaluationScores::new(0.9, 0.9, 0.4, 0.9);
        assert_eq!(
            run(metric_diagnosis, "coarse", low_recall, &a, &history(&[])),
            Some("coarse".into())
        );
        let low_precision = EvaluationScores::new(0.9, 0.5, 0.9, 0.9);
        assert_eq!(
            run(metric_diagnosis, "fine", low_precision, &a, &history(&[])),
            Some("fine".into())
        );
    }

    #[test]
    fn fallback_prefers_recommendation_then_family() {
        let a = analysis("coarse", 0.5, PatternCounts::default());
        assert_eq!(run(fallback, "medium", PASSING, &a, &history(&[])), Some("coarse".into()));

        let specific = analysis("fine", 0.5, PatternCounts { specific: 2, analytical: 0, broad: 0 });
        assert_eq!(
            run(fallback, "fine", PASSING, &specific, &history(&[])),
            Some("medium".into())
        );

        let none = analysis("medium", 0.5, PatternCounts::default());
        assert_eq!(run(fallback, "medium", PASSING, &none, &history(&[])), Some("fine".into()));
    }
}
