//! Query classification: which partitions should answer a question.
//!
//! Priority: explicit scope mention > explicit partition mention >
//! scope keyword score > every available partition.

pub mod mentions;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use granula_core::models::{PartitionId, ScopeId};

use crate::catalog::{PartitionCatalog, Scope};
use crate::normalize::{contains_phrase, normalize};

/// How a classification was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMethod {
    ScopeMention,
    PartitionMention,
    KeywordScore,
    AllPartitions,
}

/// Classifier output. `partitions` is never empty while any partition is available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub partitions: Vec<PartitionId>,
    pub matched_scope: Option<ScopeId>,
    pub method: ClassificationMethod,
}

/// Routes questions to partitions using the shared catalog.
#[derive(Debug, Clone)]
pub struct QueryClassifier {
    catalog: Arc<PartitionCatalog>,
}

impl QueryClassifier {
    pub fn new(catalog: Arc<PartitionCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &PartitionCatalog {
        &self.catalog
    }

    /// Classify `question`, restricting every result to `available` (order
    /// preserved). An empty `available` means every catalog partition.
    ///
    /// Never fails and always returns the same answer for the same input.
    pub fn classify(&self, question: &str, available: &[PartitionId]) -> Classification {
        let available: Vec<PartitionId> = if available.is_empty() {
            self.catalog.partition_ids()
        } else {
            dedup(available)
        };
        let text = normalize(question);

        let result = self
            .by_scope_mention(&text, &available)
            .or_else(|| self.by_partition_mention(&text, &available))
            .or_else(|| self.by_keywords(&text, &available))
            .unwrap_or_else(|| Classification {
                partitions: available.clone(),
                matched_scope: None,
                method: ClassificationMethod::AllPartitions,
            });

        debug!(
            method = ?result.method,
            scope = ?result.matched_scope,
            partitions = result.partitions.len(),
            "question classified"
        );
        result
    }

    fn by_scope_mention(&self, text: &str, available: &[PartitionId]) -> Option<Classification> {
        mentions::scope_mentions(text).into_iter().find_map(|token| {
            let scope = self.catalog.find_scope(token)?;
            scoped(scope, available, ClassificationMethod::ScopeMention)
        })
    }

    fn by_partition_mention(
        &self,
        text: &str,
        available: &[PartitionId],
    ) -> Option<Classification> {
        mentions::partition_mentions(text)
            .into_iter()
            .find_map(|token| {
                let partition = self.catalog.find_partition(token)?;
                match self.catalog.scope_of(&partition.id) {
                    Some(scope) => scoped(scope, available, ClassificationMethod::PartitionMention),
                    None if available.contains(&partition.id) => Some(Classification {
                        partitions: vec![partition.id.clone()],
                        matched_scope: None,
                        method: ClassificationMethod::PartitionMention,
                    }),
                    None => None,
                }
            })
    }

    fn by_keywords(&self, text: &str, available: &[PartitionId]) -> Option<Classification> {
        let mut best: Option<(&Scope, usize)> = None;
        for scope in self.catalog.scopes() {
            let score = scope
                .keywords
                .iter()
                .filter(|kw| contains_phrase(text, &normalize(kw)))
                .count();
            if score == 0 || restrict(&scope.partitions, available).is_empty() {
                continue;
            }
            // Strictly greater keeps the earliest registered scope on ties.
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((scope, score));
            }
        }
        let (scope, _) = best?;
        scoped(scope, available, ClassificationMethod::KeywordScore)
    }
}

fn scoped(
    scope: &Scope,
    available: &[PartitionId],
    method: ClassificationMethod,
) -> Option<Classification> {
    let partitions = restrict(&scope.partitions, available);
    if partitions.is_empty() {
        return None;
    }
    Some(Classification {
        partitions,
        matched_scope: Some(scope.id.clone()),
        method,
    })
}

/// `wanted` filtered to `available`, in `available` order.
fn restrict(wanted: &[PartitionId], available: &[PartitionId]) -> Vec<PartitionId> {
    available
        .iter()
        .filter(|p| wanted.contains(p))
        .cloned()
        .collect()
}

fn dedup(ids: &[PartitionId]) -> Vec<PartitionId> {
    let mut out: Vec<PartitionId> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(id.clone());
        }
    }
    out
}
