//! Metrics sinks and aggregate session metrics.

pub mod session_metrics;

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use granula_core::traits::MetricsSink;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use session_metrics::SessionMetrics;

/// Event names reported by the loop.
pub mod events {
    pub const SESSION_STARTED: &str = "session_started";
    pub const SESSION_COMPLETED: &str = "session_completed";
    pub const SESSION_CANCELLED: &str = "session_cancelled";
    pub const ATTEMPT_EVALUATED: &str = "attempt_evaluated";
    pub const RETRY_SCHEDULED: &str = "retry_scheduled";
    pub const PARTITION_UNREACHABLE: &str = "partition_unreachable";
    pub const RETRIEVAL_WIDENED: &str = "retrieval_widened";
    pub const FILTER_FALLBACK: &str = "filter_fallback";
    pub const GRADER_FAILED: &str = "grader_failed";
    pub const GENERATION_FAILED: &str = "generation_failed";
    pub const EVALUATION_FAILED: &str = "evaluation_failed";
    pub const GROUNDED_SHORT_CIRCUIT: &str = "grounded_short_circuit";
    pub const QUESTION_REWRITTEN: &str = "question_rewritten";
    pub const QUERY_DISPATCHED: &str = "query_dispatched";
    pub const QUERY_FAILED: &str = "query_failed";
    pub const INTERPRETATION_FAILED: &str = "interpretation_failed";
}

/// Emits each record as a `tracing` event at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMetricsSink;

impl MetricsSink for TracingMetricsSink {
    fn record(&self, event: &str, fields: &Value) {
        tracing::debug!(target: "granula_metrics", event = %event, fields = %fields, "metric");
    }
}

/// One recorded metric event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricEvent {
    pub name: String,
    pub fields: Value,
    pub recorded_at: DateTime<Utc>,
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingMetricsSink {
    events: Mutex<Vec<MetricEvent>>,
}

impl RecordingMetricsSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events, oldest first.
    pub fn events(&self) -> Vec<MetricEvent> {
        self.lock().clone()
    }

    /// Events named `name`, oldest first.
    pub fn named(&self, name: &str) -> Vec<MetricEvent> {
        self.lock()
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.lock().iter().filter(|e| e.name == name).count()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<MetricEvent>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl MetricsSink for RecordingMetricsSink {
    fn record(&self, event: &str, fields: &Value) {
        self.lock().push(MetricEvent {
            name: event.to_string(),
            fields: fields.clone(),
            recorded_at: Utc::now(),
        });
    }
}
