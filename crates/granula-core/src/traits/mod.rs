//! Interfaces of the external collaborators the loop calls.
//!
//! All service calls are async and object-safe so engines can hold them as
//! `Arc<dyn Trait>` shared across concurrent sessions.

pub mod evaluation;
pub mod generation;
pub mod grading;
pub mod insufficiency;
pub mod metrics;
pub mod query;
pub mod retrieval;
pub mod rewriter;

pub use evaluation::GranularEvaluator;
pub use generation::{AnswerGenerator, GroundednessChecker};
pub use grading::RelevanceGrader;
pub use insufficiency::InsufficiencyDetector;
pub use metrics::{MetricsSink, NoopMetricsSink};
pub use query::{Interpreter, QueryExecutor};
pub use retrieval::{RetrievalService, SearchRequest};
pub use rewriter::QuestionRewriter;
