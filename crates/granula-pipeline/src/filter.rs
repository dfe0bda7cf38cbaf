//! Relevance filtering with a non-empty fallback.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use granula_core::errors::GranulaResult;
use granula_core::models::Document;
use granula_core::traits::{MetricsSink, RelevanceGrader};
use granula_core::CancellationToken;
use granula_observability::metrics::events;
use granula_observability::tracing_setup::events as log_events;

use crate::cancel::race;

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub documents: Vec<Document>,
    /// Every document was rejected and the unfiltered set was kept.
    pub fell_back: bool,
}

/// Drops documents the grader judges irrelevant.
pub struct RelevanceFilter {
    grader: Arc<dyn RelevanceGrader>,
    metrics: Arc<dyn MetricsSink>,
}

impl RelevanceFilter {
    pub fn new(grader: Arc<dyn RelevanceGrader>, metrics: Arc<dyn MetricsSink>) -> Self {
        Self { grader, metrics }
    }

    /// Grade each document independently. Never turns a non-empty input
    /// into an empty output. A grading failure keeps the document.
    pub async fn filter(
        &self,
        documents: Vec<Document>,
        question: &str,
        token: &CancellationToken,
    ) -> GranulaResult<FilterOutcome> {
        let mut kept = Vec::with_capacity(documents.len());
        for (i, doc) in documents.iter().enumerate() {
            match race(token, "filter", self.grader.grade(&doc.text, question)).await? {
                Ok(true) => kept.push(doc.clone()),
                Ok(false) => {}
                Err(e) => {
                    log_events::degraded("grader", &e.to_string(), "keep document");
                    self.metrics
                        .record(events::GRADER_FAILED, &json!({ "index": i, "reason": e.to_string() }));
                    kept.push(doc.clone());
                }
            }
        }

        if kept.is_empty() && !documents.is_empty() {
            debug!(
                documents = documents.len(),
                "every document graded irrelevant, keeping unfiltered set"
            );
            self.metrics
                .record(events::FILTER_FALLBACK, &json!({ "documents": documents.len() }));
            return Ok(FilterOutcome {
                documents,
                fell_back: true,
            });
        }

        debug!(kept = kept.len(), total = documents.len(), "documents filtered");
        Ok(FilterOutcome {
            documents: kept,
            fell_back: false,
        })
    }
}
