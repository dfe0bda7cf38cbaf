use granula_core::config::{EvaluationThresholds, GranularityConfig, TierSpec};
use granula_core::models::{
    EvaluationScores, GranularityHistory, HistoryEntry, TierId, TierLadder,
};
use granula_granularity::{
    ControllerRule, DomainLexicon, GranularityAnalysis, GranularityAnalyzer,
    GranularityController, PatternCounts,
};

fn ladder() -> TierLadder {
    TierLadder::new(&GranularityConfig::default().tiers).unwrap()
}

fn controller() -> GranularityController {
    GranularityController::new(ladder())
}

fn analysis(recommended: &str, confidence: f64) -> GranularityAnalysis {
    GranularityAnalysis {
        recommended: recommended.into(),
        confidence,
        rationale: String::new(),
        counts: PatternCounts::default(),
        domain_score: 0,
    }
}

fn record(h: &mut GranularityHistory, tier: &str, attempt: u32) {
    h.record(HistoryEntry {
        tier: tier.into(),
        attempt,
        evaluation: EvaluationScores::zero(),
        success: false,
    });
}

#[test]
fn low_recall_at_medium_moves_to_coarse() {
    let analyzer = GranularityAnalyzer::new(ladder(), DomainLexicon::default());
    let mut h = GranularityHistory::new(5);
    record(&mut h, "medium", 0);
    let a = analyzer.analyze("Tell me something", &h);

    let d = controller().next_tier(
        &"medium".into(),
        &EvaluationScores::new(0.9, 0.9, 0.4, 0.9),
        &EvaluationThresholds::default(),
        &a,
        &h,
    );
    assert_eq!(d.tier, TierId::from("coarse"));
    assert_eq!(d.rule, ControllerRule::MetricDiagnosis);
    assert!(!d.guarded);
}

#[test]
fn confident_recommendation_beats_diagnosis() {
    let h = GranularityHistory::new(5);
    let d = controller().next_tier(
        &"medium".into(),
        &EvaluationScores::new(0.9, 0.9, 0.4, 0.9),
        &EvaluationThresholds::default(),
        &analysis("fine", 0.9),
        &h,
    );
    assert_eq!(d.tier, TierId::from("fine"));
    assert_eq!(d.rule, ControllerRule::HighConfidence);
}

#[test]
fn low_recall_at_the_coarsest_tier_stays_there() {
    let mut h = GranularityHistory::new(5);
    record(&mut h, "medium", 0);
    record(&mut h, "coarse", 1);
    let d = controller().next_tier(
        &"coarse".into(),
        &EvaluationScores::new(0.9, 0.9, 0.4, 0.9),
        &EvaluationThresholds::default(),
        &analysis("medium", 0.5),
        &h,
    );
    assert_eq!(d.tier, TierId::from("coarse"));
    assert_eq!(d.rule, ControllerRule::MetricDiagnosis);
    assert!(!d.guarded);
}

#[test]
fn low_precision_at_the_finest_tier_stays_there() {
    let d = controller().next_tier(
        &"fine".into(),
        &EvaluationScores::new(0.9, 0.5, 0.9, 0.9),
        &EvaluationThresholds::default(),
        &analysis("medium", 0.5),
        &GranularityHistory::new(5),
    );
    assert_eq!(d.tier, TierId::from("fine"));
    assert_eq!(d.rule, ControllerRule::MetricDiagnosis);
}

#[test]
fn staying_at_an_extreme_that_failed_twice_is_guarded() {
    let mut h = GranularityHistory::new(5);
    record(&mut h, "coarse", 0);
    record(&mut h, "coarse", 1);
    let d = controller().next_tier(
        &"coarse".into(),
        &EvaluationScores::new(0.9, 0.9, 0.4, 0.9),
        &EvaluationThresholds::default(),
        &analysis("medium", 0.5),
        &h,
    );
    assert_eq!(d.rule, ControllerRule::MetricDiagnosis);
    assert_eq!(d.tier, TierId::from("fine"));
    assert!(d.guarded);
}

#[test]
fn guard_falls_back_to_current_when_every_other_tier_failed_twice() {
    let mut h = GranularityHistory::new(5);
    record(&mut h, "fine", 0);
    record(&mut h, "coarse", 1);
    record(&mut h, "fine", 2);
    record(&mut h, "coarse", 3);
    record(&mut h, "medium", 4);
    let d = controller().next_tier(
        &"medium".into(),
        &EvaluationScores::new(0.9, 0.9, 0.4, 0.9),
        &EvaluationThresholds::default(),
        &analysis("medium", 0.5),
        &h,
    );
    assert_eq!(d.rule, ControllerRule::MetricDiagnosis);
    assert_eq!(d.tier, TierId::from("medium"));
    assert!(d.guarded);
}

#[test]
fn repeatedly_failed_tier_is_avoided() {
    let mut h = GranularityHistory::new(5);
    record(&mut h, "coarse", 0);
    record(&mut h, "medium", 1);
    record(&mut h, "coarse", 2);
    let d = controller().next_tier(
        &"medium".into(),
        &EvaluationScores::new(0.9, 0.9, 0.4, 0.9),
        &EvaluationThresholds::default(),
        &analysis("medium", 0.5),
        &h,
    );
    assert_eq!(d.rule, ControllerRule::MetricDiagnosis);
    assert_eq!(d.tier, TierId::from("fine"));
    assert!(d.guarded);
}

#[test]
fn passing_scores_move_off_the_current_tier() {
    let h = GranularityHistory::new(5);
    for current in ["fine", "medium", "coarse"] {
        let d = controller().next_tier(
            &current.into(),
            &EvaluationScores::new(0.9, 0.9, 0.9, 0.9),
            &EvaluationThresholds::default(),
            &analysis(current, 0.5),
            &h,
        );
        assert_ne!(d.tier.as_str(), current);
    }
}

#[test]
fn single_tier_ladder_always_returns_it() {
    let ladder = TierLadder::new(&[TierSpec {
        id: "only".into(),
        chunk_size: 512,
    }])
    .unwrap();
    let d = GranularityController::new(ladder).next_tier(
        &"only".into(),
        &EvaluationScores::zero(),
        &EvaluationThresholds::default(),
        &analysis("only", 0.5),
        &GranularityHistory::new(5),
    );
    assert_eq!(d.tier, TierId::from("only"));
    assert_eq!(d.rule, ControllerRule::SingleTier);
}
