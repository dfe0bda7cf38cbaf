use async_trait::async_trait;

use crate::errors::ServiceError;

/// Produces an enhanced form of a question for a retry.
#[async_trait]
pub trait QuestionRewriter: Send + Sync {
    async fn rewrite(&self, question: &str) -> Result<String, ServiceError>;
}
