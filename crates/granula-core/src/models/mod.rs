//! Session model and value types shared across the workspace.

pub mod document;
pub mod evaluation;
pub mod generation;
pub mod history;
pub mod ids;
pub mod outcome;
pub mod session;
pub mod tabular;
pub mod tier;

pub use document::Document;
pub use evaluation::{EvaluationDimension, EvaluationScores};
pub use generation::{Generation, GenerationKind, RawGeneration};
pub use history::{GranularityHistory, HistoryEntry};
pub use ids::{PartitionId, ScopeId, TierId};
pub use outcome::{AnswerOutcome, QueryExecution};
pub use session::{LoopState, SessionState, TerminalReason};
pub use tabular::TabularResult;
pub use tier::TierLadder;
