//! Answer generation and auxiliary groundedness checks.

pub mod envelope;

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use granula_core::errors::GranulaResult;
use granula_core::models::{Document, Generation};
use granula_core::traits::{AnswerGenerator, GroundednessChecker, MetricsSink};
use granula_core::CancellationToken;
use granula_observability::metrics::events;
use granula_observability::tracing_setup::events as log_events;

use crate::cancel::race;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub generation: Generation,
    /// The generator failed and `generation` is the empty placeholder answer.
    pub failed: bool,
}

/// Calls the generator and normalizes its envelope.
pub struct GenerationStage {
    generator: Arc<dyn AnswerGenerator>,
    checker: Option<Arc<dyn GroundednessChecker>>,
    metrics: Arc<dyn MetricsSink>,
}

impl GenerationStage {
    pub fn new(
        generator: Arc<dyn AnswerGenerator>,
        checker: Option<Arc<dyn GroundednessChecker>>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            generator,
            checker,
            metrics,
        }
    }

    pub fn has_checker(&self) -> bool {
        self.checker.is_some()
    }

    /// Generate from `documents`. A generator failure yields an empty answer.
    pub async fn generate(
        &self,
        question: &str,
        documents: &[Document],
        token: &CancellationToken,
    ) -> GranulaResult<GenerationOutcome> {
        match race(token, "generate", self.generator.generate(question, documents)).await? {
            Ok(raw) => {
                let generation = envelope::normalize(raw);
                debug!(kind = %generation.kind(), chars = generation.text().len(), "generated");
                Ok(GenerationOutcome {
                    generation,
                    failed: false,
                })
            }
            Err(e) => {
                log_events::degraded("generator", &e.to_string(), "empty answer");
                self.metrics
                    .record(events::GENERATION_FAILED, &json!({ "reason": e.to_string() }));
                Ok(GenerationOutcome {
                    generation: Generation::Answer(String::new()),
                    failed: true,
                })
            }
        }
    }

    /// Whether `answer` is grounded in `documents` and addresses `question`.
    ///
    /// False without a checker. Checker failures count as not grounded.
    pub async fn is_grounded(
        &self,
        question: &str,
        documents: &[Document],
        answer: &str,
        token: &CancellationToken,
    ) -> GranulaResult<bool> {
        let Some(checker) = &self.checker else {
            return Ok(false);
        };

        let grounded = match race(token, "groundedness", checker.is_grounded(documents, answer)).await? {
            Ok(v) => v,
            Err(e) => {
                log_events::degraded("groundedness", &e.to_string(), "treat as not grounded");
                return Ok(false);
            }
        };
        if !grounded {
            return Ok(false);
        }

        match race(token, "groundedness", checker.addresses_question(question, answer)).await? {
            Ok(v) => Ok(v),
            Err(e) => {
                log_events::degraded("groundedness", &e.to_string(), "treat as not grounded");
                Ok(false)
            }
        }
    }
}
