use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::models::{Document, EvaluationScores, Generation};

/// External judge scoring a generation on the four quality dimensions.
#[async_trait]
pub trait GranularEvaluator: Send + Sync {
    async fn evaluate(
        &self,
        question: &str,
        context: &[Document],
        generation: &Generation,
    ) -> Result<EvaluationScores, ServiceError>;
}
