use granula_core::config::{EvaluationThresholds, GranularityConfig};
use granula_core::models::{EvaluationScores, GranularityHistory, HistoryEntry, TierLadder};
use granula_granularity::{DomainLexicon, GranularityAnalyzer, GranularityController};
use proptest::prelude::*;

const TIERS: [&str; 3] = ["fine", "medium", "coarse"];

fn ladder() -> TierLadder {
    TierLadder::new(&GranularityConfig::default().tiers).unwrap()
}

fn analyzer() -> GranularityAnalyzer {
    let lexicon = DomainLexicon::new(
        vec!["graduates".into()],
        vec!["credits".into(), "dropout rate".into()],
        vec!["degree".into(), "academic year".into()],
        vec!["ects".into()],
    );
    GranularityAnalyzer::new(ladder(), lexicon)
}

fn history_strategy() -> impl Strategy<Value = GranularityHistory> {
    proptest::collection::vec((0..3usize, any::<bool>()), 0..6).prop_map(|entries| {
        let mut h = GranularityHistory::new(5);
        for (i, (tier, success)) in entries.into_iter().enumerate() {
            h.record(HistoryEntry {
                tier: TIERS[tier].into(),
                attempt: i as u32,
                evaluation: EvaluationScores::zero(),
                success,
            });
        }
        h
    })
}

fn scores_strategy() -> impl Strategy<Value = EvaluationScores> {
    (0.0..=1.0f64, 0.0..=1.0f64, 0.0..=1.0f64, 0.0..=1.0f64)
        .prop_map(|(f, p, r, a)| EvaluationScores::new(f, p, r, a))
}

const WORDS: &[&str] = &[
    "how", "many", "exact", "2023", "compare", "why", "overview", "general", "trends",
    "degree", "credits", "ects", "graduates", "the", "students", "cuantos", "resumen",
];

fn question() -> impl Strategy<Value = String> {
    prop_oneof![
        ".{0,60}",
        proptest::collection::vec(proptest::sample::select(WORDS), 0..10).prop_map(|w| w.join(" ")),
    ]
}

proptest! {
    #[test]
    fn confidence_stays_in_unit_interval(q in question(), h in history_strategy()) {
        let a = analyzer().analyze(&q, &h);
        prop_assert!((0.0..=1.0).contains(&a.confidence));
        prop_assert!(ladder().contains(&a.recommended));
    }

    #[test]
    fn controller_avoids_repeat_failures_when_it_can(
        q in question(),
        h in history_strategy(),
        scores in scores_strategy(),
        current in 0..3usize,
    ) {
        let current = TIERS[current].into();
        let analysis = analyzer().analyze(&q, &h);
        let d = GranularityController::new(ladder()).next_tier(
            &current,
            &scores,
            &EvaluationThresholds::default(),
            &analysis,
            &h,
        );
        prop_assert!(ladder().contains(&d.tier));

        let fewest = ladder().ids().map(|t| h.failures(&t)).min().unwrap();
        if fewest < 2 {
            prop_assert!(h.failures(&d.tier) < 2);
        }
    }
}
