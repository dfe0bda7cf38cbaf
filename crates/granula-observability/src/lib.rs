//! # granula-observability
//!
//! Tracing initialization, span and event definitions for the retry loop,
//! metrics sinks, and aggregate session metrics.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::{MetricEvent, RecordingMetricsSink, SessionMetrics, TracingMetricsSink};
