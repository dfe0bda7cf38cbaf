//! Structured log events for loop milestones.
//!
//! Each function emits one `tracing` event with structured fields.

use granula_core::models::AnswerOutcome;

/// Log the end of a session.
pub fn session_completed(outcome: &AnswerOutcome) {
    tracing::info!(
        event = "session_completed",
        terminal_reason = %outcome.terminal_reason,
        retry_count = outcome.retry_count,
        final_tier = %outcome.final_tier,
        documents = outcome.document_count,
        "session completed"
    );
}

/// Log a scheduled retry.
pub fn retry_scheduled(from: &str, to: &str, rule: &str, retry_count: u32) {
    tracing::info!(
        event = "retry_scheduled",
        from = %from,
        to = %to,
        rule = %rule,
        retry_count,
        "retry scheduled"
    );
}

/// Log an unreachable partition.
pub fn partition_unreachable(partition: &str, reason: &str) {
    tracing::warn!(
        event = "partition_unreachable",
        partition = %partition,
        reason = %reason,
        "partition unreachable, continuing without it"
    );
}

/// Log a collaborator failure the loop recovered from.
pub fn degraded(component: &str, failure: &str, fallback: &str) {
    tracing::warn!(
        event = "degraded",
        component = %component,
        failure = %failure,
        fallback = %fallback,
        "collaborator failed, using fallback"
    );
}
