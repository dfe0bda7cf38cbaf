//! # granula-granularity
//!
//! Chooses the retrieval granularity tier for each attempt: the analyzer
//! reads the question, the controller reads the evaluation and decides where
//! to move on a retry.

pub mod analyzer;
pub mod controller;
pub mod lexicon;
pub mod patterns;

pub use analyzer::{GranularityAnalysis, GranularityAnalyzer};
pub use controller::{ControllerRule, GranularityController, TierDecision};
pub use lexicon::DomainLexicon;
pub use patterns::{PatternCounts, PatternFamily};
