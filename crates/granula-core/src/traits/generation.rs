use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::models::{Document, RawGeneration};

/// Produces a prose answer or a structured query from filtered context.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(
        &self,
        question: &str,
        context: &[Document],
    ) -> Result<RawGeneration, ServiceError>;
}

/// Auxiliary groundedness checks run against the same context as generation.
#[async_trait]
pub trait GroundednessChecker: Send + Sync {
    /// Whether every claim in `answer` is supported by `context`.
    async fn is_grounded(&self, context: &[Document], answer: &str) -> Result<bool, ServiceError>;

    /// Whether `answer` actually addresses `question`.
    async fn addresses_question(&self, question: &str, answer: &str)
        -> Result<bool, ServiceError>;
}
