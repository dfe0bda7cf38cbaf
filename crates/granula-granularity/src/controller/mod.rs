//! Granularity controller: picks the tier for the next attempt.

pub mod rules;

use serde::{Deserialize, Serialize};
use tracing::debug;

use granula_core::config::EvaluationThresholds;
use granula_core::constants::REPEAT_FAILURE_LIMIT;
use granula_core::models::{EvaluationScores, GranularityHistory, TierId, TierLadder};

use crate::analyzer::GranularityAnalysis;

pub use rules::{ControllerRule, RuleContext};

/// Tier for the next attempt and the rule that chose it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDecision {
    pub tier: TierId,
    pub rule: ControllerRule,
    /// The rule's choice was swapped out by the repeat-failure guard.
    pub guarded: bool,
}

#[derive(Debug, Clone)]
pub struct GranularityController {
    ladder: TierLadder,
}

impl GranularityController {
    pub fn new(ladder: TierLadder) -> Self {
        Self { ladder }
    }

    pub fn next_tier(
        &self,
        current: &TierId,
        scores: &EvaluationScores,
        thresholds: &EvaluationThresholds,
        analysis: &GranularityAnalysis,
        history: &GranularityHistory,
    ) -> TierDecision {
        if self.ladder.len() == 1 {
            return TierDecision {
                tier: self.ladder.finest(),
                rule: ControllerRule::SingleTier,
                guarded: false,
            };
        }

        let ctx = RuleContext {
            ladder: &self.ladder,
            current,
            scores,
            thresholds,
            analysis,
            history,
        };

        let (rule, chosen) = rules::all_rules()
            .into_iter()
            .find_map(|(rule, apply)| {
                apply(&ctx)
                    .filter(|t| self.ladder.contains(t))
                    .map(|t| (rule, t))
            })
            .unwrap_or_else(|| (ControllerRule::Fallback, current.clone()));

        let (tier, guarded) = self.guard(chosen, current, history);
        debug!(
            from = %current,
            to = %tier,
            rule = rule.as_str(),
            guarded,
            "next granularity tier"
        );
        TierDecision {
            tier,
            rule,
            guarded,
        }
    }

    /// Swap a tier that already failed too often for the tier with the
    /// fewest failures. Non-current tiers come first, finest first; the
    /// current tier is the last candidate.
    fn guard(
        &self,
        chosen: TierId,
        current: &TierId,
        history: &GranularityHistory,
    ) -> (TierId, bool) {
        let failures = history.failures(&chosen);
        if failures < REPEAT_FAILURE_LIMIT {
            return (chosen, false);
        }
        let alternative = self
            .ladder
            .others(current)
            .chain(std::iter::once(current.clone()))
            .filter(|t| t != &chosen)
            .min_by_key(|t| history.failures(t));
        match alternative {
            Some(alt) if history.failures(&alt) < failures => (alt, true),
            _ => (chosen, false),
        }
    }
}
