//! Four-dimension answer quality scores.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EvaluationThresholds;

/// The four independent quality dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationDimension {
    Faithfulness,
    ContextPrecision,
    ContextRecall,
    AnswerRelevance,
}

impl EvaluationDimension {
    pub const ALL: [EvaluationDimension; 4] = [
        Self::Faithfulness,
        Self::ContextPrecision,
        Self::ContextRecall,
        Self::AnswerRelevance,
    ];

    pub fn threshold(&self, thresholds: &EvaluationThresholds) -> f64 {
        match self {
            Self::Faithfulness => thresholds.faithfulness,
            Self::ContextPrecision => thresholds.context_precision,
            Self::ContextRecall => thresholds.context_recall,
            Self::AnswerRelevance => thresholds.answer_relevance,
        }
    }
}

impl fmt::Display for EvaluationDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Faithfulness => "faithfulness",
            Self::ContextPrecision => "context_precision",
            Self::ContextRecall => "context_recall",
            Self::AnswerRelevance => "answer_relevance",
        };
        f.write_str(name)
    }
}

/// Scores in [0, 1] for each dimension.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EvaluationScores {
    pub faithfulness: f64,
    pub context_precision: f64,
    pub context_recall: f64,
    pub answer_relevance: f64,
}

impl EvaluationScores {
    pub fn new(
        faithfulness: f64,
        context_precision: f64,
        context_recall: f64,
        answer_relevance: f64,
    ) -> Self {
        Self {
            faithfulness,
            context_precision,
            context_recall,
            answer_relevance,
        }
    }

    /// All-zero scores, used when no evaluation could be obtained.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Clamp every score into [0, 1]. NaN becomes 0.
    pub fn clamped(self) -> Self {
        let c = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Self {
            faithfulness: c(self.faithfulness),
            context_precision: c(self.context_precision),
            context_recall: c(self.context_recall),
            answer_relevance: c(self.answer_relevance),
        }
    }

    pub fn score(&self, dimension: EvaluationDimension) -> f64 {
        match dimension {
            EvaluationDimension::Faithfulness => self.faithfulness,
            EvaluationDimension::ContextPrecision => self.context_precision,
            EvaluationDimension::ContextRecall => self.context_recall,
            EvaluationDimension::AnswerRelevance => self.answer_relevance,
        }
    }

    /// Whether `dimension` meets or exceeds its threshold.
    pub fn meets(&self, dimension: EvaluationDimension, thresholds: &EvaluationThresholds) -> bool {
        self.score(dimension) >= dimension.threshold(thresholds)
    }

    /// Success requires every dimension to pass at once.
    pub fn passes(&self, thresholds: &EvaluationThresholds) -> bool {
        EvaluationDimension::ALL
            .iter()
            .all(|d| self.meets(*d, thresholds))
    }

    /// Dimensions below their threshold, in evaluation order.
    pub fn failing(&self, thresholds: &EvaluationThresholds) -> Vec<EvaluationDimension> {
        EvaluationDimension::ALL
            .into_iter()
            .filter(|d| !self.meets(*d, thresholds))
            .collect()
    }

    pub fn mean(&self) -> f64 {
        (self.faithfulness + self.context_precision + self.context_recall + self.answer_relevance)
            / 4.0
    }
}
