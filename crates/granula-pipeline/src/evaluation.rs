//! Granular evaluation against the configured thresholds.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use granula_core::config::EvaluationThresholds;
use granula_core::errors::GranulaResult;
use granula_core::models::{Document, EvaluationDimension, EvaluationScores, Generation};
use granula_core::traits::{GranularEvaluator, MetricsSink};
use granula_core::CancellationToken;
use granula_observability::metrics::events;
use granula_observability::tracing_setup::events as log_events;

use crate::cancel::race;

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationVerdict {
    /// Scores clamped into [0, 1].
    pub scores: EvaluationScores,
    /// Every dimension meets its threshold.
    pub passed: bool,
    pub failing: Vec<EvaluationDimension>,
    /// The evaluator failed and `scores` are all zero.
    pub failed: bool,
}

pub struct EvaluationStage {
    evaluator: Arc<dyn GranularEvaluator>,
    thresholds: EvaluationThresholds,
    metrics: Arc<dyn MetricsSink>,
}

impl EvaluationStage {
    pub fn new(
        evaluator: Arc<dyn GranularEvaluator>,
        thresholds: EvaluationThresholds,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            evaluator,
            thresholds,
            metrics,
        }
    }

    pub fn thresholds(&self) -> &EvaluationThresholds {
        &self.thresholds
    }

    /// Score `generation`. An evaluator failure yields all-zero scores.
    pub async fn evaluate(
        &self,
        question: &str,
        documents: &[Document],
        generation: &Generation,
        token: &CancellationToken,
    ) -> GranulaResult<EvaluationVerdict> {
        let raw = race(
            token,
            "evaluate",
            self.evaluator.evaluate(question, documents, generation),
        )
        .await?;

        match raw {
            Ok(scores) => Ok(self.verdict(scores.clamped(), false)),
            Err(e) => {
                log_events::degraded("evaluator", &e.to_string(), "zero scores");
                self.metrics
                    .record(events::EVALUATION_FAILED, &json!({ "reason": e.to_string() }));
                Ok(self.verdict(EvaluationScores::zero(), true))
            }
        }
    }

    /// Verdict for scores that were not obtained from the evaluator.
    pub fn skipped(&self) -> EvaluationVerdict {
        self.verdict(EvaluationScores::zero(), true)
    }

    fn verdict(&self, scores: EvaluationScores, failed: bool) -> EvaluationVerdict {
        let failing = scores.failing(&self.thresholds);
        let passed = failing.is_empty();
        debug!(
            faithfulness = scores.faithfulness,
            context_precision = scores.context_precision,
            context_recall = scores.context_recall,
            answer_relevance = scores.answer_relevance,
            passed,
            "attempt evaluated"
        );
        EvaluationVerdict {
            scores,
            passed,
            failing,
            failed,
        }
    }
}
