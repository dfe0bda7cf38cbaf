//! # granula-core
//!
//! Foundation crate for the Granula adaptive retrieval loop.
//! Defines the session model, collaborator traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod cancellation;
pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use cancellation::CancellationToken;
pub use config::GranulaConfig;
pub use errors::{GranulaError, GranulaResult};
pub use models::{
    AnswerOutcome, Document, EvaluationScores, Generation, GenerationKind, GranularityHistory,
    HistoryEntry, LoopState, PartitionId, ScopeId, SessionState, TerminalReason, TierId,
    TierLadder,
};
