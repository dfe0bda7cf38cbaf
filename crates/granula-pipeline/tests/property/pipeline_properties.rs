use std::collections::HashSet;
use std::sync::Arc;

use granula_core::models::{EvaluationScores, TerminalReason};
use granula_core::{AnswerOutcome, GranulaConfig};
use granula_pipeline::AdaptiveEngine;
use granula_routing::PartitionCatalog;
use proptest::prelude::*;
use test_fixtures::fakes::{MarkerGrader, ScriptedEvaluator, ScriptedGenerator, ScriptedRetrieval};
use test_fixtures::institutional_catalog_toml;

fn scores_strategy() -> impl Strategy<Value = EvaluationScores> {
    (0.0f64..1.2, 0.0f64..1.2, 0.0f64..1.2, 0.0f64..1.2)
        .prop_map(|(f, p, r, a)| EvaluationScores::new(f, p, r, a))
}

fn run(max_retries: u32, max_history: usize, script: &[EvaluationScores]) -> AnswerOutcome {
    let mut config = GranulaConfig::default();
    config.retry.max_retries = max_retries;
    config.retry.max_history = max_history;

    let engine = AdaptiveEngine::builder(config)
        .with_catalog(Arc::new(
            PartitionCatalog::from_toml(&institutional_catalog_toml()).unwrap(),
        ))
        .with_retrieval(Arc::new(
            ScriptedRetrieval::new().with_documents("enrollment", &["Enrollment 2023: 1200."]),
        ))
        .with_grader(Arc::new(MarkerGrader::new()))
        .with_generator(Arc::new(ScriptedGenerator::answers(&["1200 students."])))
        .with_evaluator(Arc::new(ScriptedEvaluator::scores(script)))
        .build()
        .unwrap();

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(engine.answer("How many students enrolled in 2023?"))
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn retries_are_bounded(
        max_retries in 0u32..5,
        script in proptest::collection::vec(scores_strategy(), 1..8),
    ) {
        let outcome = run(max_retries, 5, &script);
        prop_assert!(outcome.retry_count <= max_retries);
        if outcome.terminal_reason == TerminalReason::MaxRetries {
            prop_assert_eq!(outcome.retry_count, max_retries);
        }
    }

    #[test]
    fn history_is_capped_and_unique(
        max_retries in 0u32..8,
        max_history in 1usize..6,
        script in proptest::collection::vec(scores_strategy(), 1..10),
    ) {
        let outcome = run(max_retries, max_history, &script);
        prop_assert!(outcome.granularity_history.len() <= max_history);
        let pairs: HashSet<_> = outcome
            .granularity_history
            .iter()
            .map(|e| (e.attempt, e.tier.clone()))
            .collect();
        prop_assert_eq!(pairs.len(), outcome.granularity_history.len());
    }

    #[test]
    fn first_passing_attempt_ends_the_session(
        max_retries in 0u32..5,
        script in proptest::collection::vec(scores_strategy(), 1..8),
    ) {
        let thresholds = GranulaConfig::default().thresholds;
        let outcome = run(max_retries, 5, &script);

        // The evaluator repeats its last entry once the script runs out.
        let score_at = |i: usize| script[i.min(script.len() - 1)].clamped();
        let first_pass = (0..=max_retries as usize).find(|&i| score_at(i).passes(&thresholds));

        match first_pass {
            Some(i) => {
                prop_assert_eq!(outcome.terminal_reason, TerminalReason::Success);
                prop_assert_eq!(outcome.retry_count as usize, i);
            }
            None => {
                prop_assert_eq!(outcome.terminal_reason, TerminalReason::MaxRetries);
            }
        }
    }
}
