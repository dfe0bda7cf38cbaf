use granula_core::models::{EvaluationScores, GranularityHistory, HistoryEntry};
use proptest::prelude::*;

const TIERS: [&str; 3] = ["fine", "medium", "coarse"];

fn entry_strategy() -> impl Strategy<Value = (usize, u32, bool)> {
    (0..TIERS.len(), 0u32..8, any::<bool>())
}

proptest! {
    #[test]
    fn history_never_exceeds_capacity(
        capacity in 1usize..10,
        entries in proptest::collection::vec(entry_strategy(), 0..40),
    ) {
        let mut h = GranularityHistory::new(capacity);
        for (tier, attempt, success) in entries {
            h.record(HistoryEntry {
                tier: TIERS[tier].into(),
                attempt,
                evaluation: EvaluationScores::zero(),
                success,
            });
            prop_assert!(h.len() <= capacity);
        }
    }

    #[test]
    fn history_pairs_are_unique(
        entries in proptest::collection::vec(entry_strategy(), 0..40),
    ) {
        let mut h = GranularityHistory::new(64);
        for (tier, attempt, success) in entries {
            h.record(HistoryEntry {
                tier: TIERS[tier].into(),
                attempt,
                evaluation: EvaluationScores::zero(),
                success,
            });
        }
        let all: Vec<_> = h.iter().map(|e| (e.attempt, e.tier.clone())).collect();
        for (i, a) in all.iter().enumerate() {
            prop_assert!(!all[i + 1..].contains(a));
        }
    }

    #[test]
    fn clamped_scores_stay_in_unit_interval(
        f in any::<f64>(), p in any::<f64>(), r in any::<f64>(), a in any::<f64>(),
    ) {
        let s = EvaluationScores::new(f, p, r, a).clamped();
        for v in [s.faithfulness, s.context_precision, s.context_recall, s.answer_relevance] {
            prop_assert!((0.0..=1.0).contains(&v));
        }
    }
}
