use serde::{Deserialize, Serialize};

use super::defaults;

/// Per-dimension pass thresholds for the granular evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationThresholds {
    pub faithfulness: f64,
    pub context_precision: f64,
    pub context_recall: f64,
    pub answer_relevance: f64,
}

impl Default for EvaluationThresholds {
    fn default() -> Self {
        Self {
            faithfulness: defaults::DEFAULT_FAITHFULNESS_THRESHOLD,
            context_precision: defaults::DEFAULT_CONTEXT_PRECISION_THRESHOLD,
            context_recall: defaults::DEFAULT_CONTEXT_RECALL_THRESHOLD,
            answer_relevance: defaults::DEFAULT_ANSWER_RELEVANCE_THRESHOLD,
        }
    }
}

impl EvaluationThresholds {
    /// `(field name, value)` pairs, in evaluation order.
    pub fn named(&self) -> [(&'static str, f64); 4] {
        [
            ("faithfulness", self.faithfulness),
            ("context_precision", self.context_precision),
            ("context_recall", self.context_recall),
            ("answer_relevance", self.answer_relevance),
        ]
    }
}
