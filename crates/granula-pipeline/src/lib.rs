//! # granula-pipeline
//!
//! The adaptive retrieval loop: retrieval aggregation, relevance filtering,
//! generation with envelope normalization, granular evaluation, termination
//! decisions, the structured-query branch, and the [`AdaptiveEngine`] that
//! drives them through the session state machine.

mod cancel;
pub mod engine;
pub mod evaluation;
pub mod filter;
pub mod generation;
pub mod insufficiency;
pub mod query_branch;
pub mod retrieval;
pub mod termination;

pub use engine::{AdaptiveEngine, AdaptiveEngineBuilder};
pub use insufficiency::PhraseInsufficiencyDetector;
pub use termination::LoopDecision;
