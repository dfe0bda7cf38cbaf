use async_trait::async_trait;

use crate::errors::ServiceError;

/// Binary relevance judgement for a single retrieved text.
#[async_trait]
pub trait RelevanceGrader: Send + Sync {
    async fn grade(&self, text: &str, question: &str) -> Result<bool, ServiceError>;
}
