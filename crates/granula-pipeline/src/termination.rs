//! Post-evaluation decision: stop, dispatch the query, or retry.

use granula_core::models::{GenerationKind, TerminalReason};

/// What the loop does after an evaluated attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopDecision {
    DispatchQuery,
    Done(TerminalReason),
    Retry,
}

/// Inputs of [`decide`] for one attempt.
#[derive(Debug, Clone, Copy)]
pub struct AttemptSummary {
    pub kind: GenerationKind,
    pub passed: bool,
    pub insufficient: bool,
    pub retry_count: u32,
    pub max_retries: u32,
}

/// Checked in order: a query is dispatched, a pass succeeds, an exhausted
/// budget stops, an insufficient answer stops, anything else retries.
///
/// An insufficient first answer stops as insufficient even with a zero
/// retry budget.
pub fn decide(attempt: AttemptSummary) -> LoopDecision {
    if attempt.kind == GenerationKind::Query {
        return LoopDecision::DispatchQuery;
    }
    if attempt.passed {
        return LoopDecision::Done(TerminalReason::Success);
    }
    if attempt.insufficient && attempt.retry_count == 0 {
        return LoopDecision::Done(TerminalReason::InsufficientInfo);
    }
    if attempt.retry_count >= attempt.max_retries {
        return LoopDecision::Done(TerminalReason::MaxRetries);
    }
    if attempt.insufficient {
        return LoopDecision::Done(TerminalReason::InsufficientInfo);
    }
    LoopDecision::Retry
}
