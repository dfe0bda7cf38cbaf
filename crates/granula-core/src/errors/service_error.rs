/// Failures reported by external collaborators (retrieval, grading, generation,
/// evaluation, query execution, interpretation).
///
/// The loop recovers from every variant locally; none of them aborts a session.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ServiceError {
    #[error("{service} unavailable: {reason}")]
    Unavailable { service: String, reason: String },

    #[error("{service} returned an invalid response: {reason}")]
    InvalidResponse { service: String, reason: String },

    #[error("{service} rejected the request: {reason}")]
    Rejected { service: String, reason: String },
}

impl ServiceError {
    /// Shorthand for an unavailable collaborator.
    pub fn unavailable(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            service: service.into(),
            reason: reason.into(),
        }
    }

    /// Name of the collaborator that failed.
    pub fn service(&self) -> &str {
        match self {
            Self::Unavailable { service, .. }
            | Self::InvalidResponse { service, .. }
            | Self::Rejected { service, .. } => service,
        }
    }
}
