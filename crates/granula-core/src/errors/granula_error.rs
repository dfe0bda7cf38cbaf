use super::{CatalogError, ConfigError, ServiceError};

/// Top-level error for the Granula workspace.
///
/// Only cancellation and construction-time problems reach the caller of
/// `answer`; collaborator faults degrade inside the loop instead.
#[derive(Debug, thiserror::Error)]
pub enum GranulaError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    #[error("session cancelled during {stage}")]
    Cancelled { stage: String },

    #[error("invalid state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("terminal reason already set to {existing}")]
    TerminalReasonAlreadySet { existing: String },

    #[error("unknown granularity tier: {tier}")]
    UnknownTier { tier: String },
}

/// Convenience alias used across all Granula crates.
pub type GranulaResult<T> = Result<T, GranulaError>;
