use serde_json::Value;

/// Fire-and-forget metrics destination. Nothing the loop does depends on it.
pub trait MetricsSink: Send + Sync {
    fn record(&self, event: &str, fields: &Value);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {
    fn record(&self, _event: &str, _fields: &Value) {}
}
