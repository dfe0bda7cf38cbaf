use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::models::{Document, PartitionId, TierId};

/// One per-partition search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub partition: PartitionId,
    /// Granularity the results should come from.
    pub tier: TierId,
    /// Chunk size configured for `tier`.
    pub chunk_size: u32,
    pub limit: usize,
}

/// Similarity search over one partition at one granularity.
#[async_trait]
pub trait RetrievalService: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Document>, ServiceError>;
}
