//! Retrieval aggregation across partitions.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use granula_core::errors::GranulaResult;
use granula_core::models::{Document, PartitionId, TierId, TierLadder};
use granula_core::traits::{MetricsSink, RetrievalService, SearchRequest};
use granula_core::{CancellationToken, GranulaError};
use granula_observability::metrics::events;
use granula_observability::tracing_setup::events as log_events;
use granula_routing::PartitionCatalog;

use crate::cancel::race;

/// One retrieval round.
#[derive(Debug, Clone, Copy)]
pub struct RetrievalRequest<'a> {
    pub question: &'a str,
    pub partitions: &'a [PartitionId],
    pub tier: &'a TierId,
    pub retry_count: u32,
    /// Partitions already queried earlier in the session.
    pub already_searched: &'a [PartitionId],
    /// Partitions the engine may use. Empty means the whole catalog.
    pub available: &'a [PartitionId],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrievalOutcome {
    /// Merged documents in partition order, capped.
    pub documents: Vec<Document>,
    /// Every partition queried this round.
    pub searched: Vec<PartitionId>,
    /// Replacement partition selection after an empty retry round.
    pub widened_to: Option<Vec<PartitionId>>,
    pub unreachable: Vec<PartitionId>,
}

/// Fans a question out over partitions and merges the results.
pub struct RetrievalAggregator {
    service: Arc<dyn RetrievalService>,
    catalog: Arc<PartitionCatalog>,
    ladder: TierLadder,
    per_partition_limit: usize,
    max_documents: usize,
    metrics: Arc<dyn MetricsSink>,
}

impl RetrievalAggregator {
    pub fn new(
        service: Arc<dyn RetrievalService>,
        catalog: Arc<PartitionCatalog>,
        ladder: TierLadder,
        per_partition_limit: usize,
        max_documents: usize,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            service,
            catalog,
            ladder,
            per_partition_limit,
            max_documents,
            metrics,
        }
    }

    /// Search every partition in `request.partitions` at `request.tier`.
    ///
    /// On a retry that found nothing, searches every available partition not
    /// yet queried in the session and reports them in `widened_to`.
    pub async fn retrieve(
        &self,
        request: RetrievalRequest<'_>,
        token: &CancellationToken,
    ) -> GranulaResult<RetrievalOutcome> {
        let chunk_size = self
            .ladder
            .chunk_size(request.tier)
            .ok_or_else(|| GranulaError::UnknownTier {
                tier: request.tier.to_string(),
            })?;

        let mut outcome = RetrievalOutcome::default();
        self.search_all(request, request.partitions, chunk_size, &mut outcome, token)
            .await?;

        if outcome.documents.is_empty() && request.retry_count > 0 {
            let pool = if request.available.is_empty() {
                self.catalog.partition_ids()
            } else {
                request.available.to_vec()
            };
            let widened: Vec<PartitionId> = pool
                .into_iter()
                .filter(|p| !request.already_searched.contains(p) && !outcome.searched.contains(p))
                .collect();
            if !widened.is_empty() {
                info!(
                    partitions = widened.len(),
                    retry_count = request.retry_count,
                    "empty retrieval, widening to unsearched partitions"
                );
                self.metrics.record(
                    events::RETRIEVAL_WIDENED,
                    &json!({
                        "retry_count": request.retry_count,
                        "partitions": widened.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
                    }),
                );
                self.search_all(request, &widened, chunk_size, &mut outcome, token)
                    .await?;
                outcome.widened_to = Some(widened);
            }
        }

        outcome.documents.truncate(self.max_documents);
        debug!(
            documents = outcome.documents.len(),
            searched = outcome.searched.len(),
            unreachable = outcome.unreachable.len(),
            tier = %request.tier,
            "retrieval round complete"
        );
        Ok(outcome)
    }

    async fn search_all(
        &self,
        request: RetrievalRequest<'_>,
        partitions: &[PartitionId],
        chunk_size: u32,
        outcome: &mut RetrievalOutcome,
        token: &CancellationToken,
    ) -> GranulaResult<()> {
        for partition in partitions {
            let search = SearchRequest {
                query: request.question.to_string(),
                partition: partition.clone(),
                tier: request.tier.clone(),
                chunk_size,
                limit: self.per_partition_limit,
            };
            outcome.searched.push(partition.clone());
            match race(token, "retrieve", self.service.search(&search)).await? {
                Ok(docs) => outcome.documents.extend(
                    docs.into_iter()
                        .map(|d| d.with_partition(partition.clone())),
                ),
                Err(e) => {
                    log_events::partition_unreachable(partition.as_str(), &e.to_string());
                    self.metrics.record(
                        events::PARTITION_UNREACHABLE,
                        &json!({
                            "partition": partition.as_str(),
                            "tier": request.tier.as_str(),
                            "reason": e.to_string(),
                        }),
                    );
                    outcome.unreachable.push(partition.clone());
                }
            }
        }
        Ok(())
    }
}
