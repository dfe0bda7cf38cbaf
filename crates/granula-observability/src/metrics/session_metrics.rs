//! Outcome distribution, retries, tier usage, latency across sessions.

use std::collections::HashMap;
use std::time::Duration;

use granula_core::models::{AnswerOutcome, TerminalReason};
use serde::{Deserialize, Serialize};

/// Cap on retained latency samples.
const MAX_DURATION_SAMPLES: usize = 10_000;

/// Aggregates finished sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionMetrics {
    pub total_sessions: u64,
    pub total_retries: u64,
    /// Sessions per terminal reason.
    pub terminal_reasons: HashMap<TerminalReason, u64>,
    /// Attempts per tier, across all sessions.
    pub tier_usage: HashMap<String, u64>,
    durations_ms: Vec<u64>,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished session.
    pub fn record_outcome(&mut self, outcome: &AnswerOutcome, duration: Duration) {
        self.total_sessions += 1;
        self.total_retries += u64::from(outcome.retry_count);
        *self
            .terminal_reasons
            .entry(outcome.terminal_reason)
            .or_default() += 1;
        for entry in &outcome.granularity_history {
            *self.tier_usage.entry(entry.tier.to_string()).or_default() += 1;
        }
        self.durations_ms.push(duration.as_millis() as u64);
        if self.durations_ms.len() > MAX_DURATION_SAMPLES {
            self.durations_ms
                .drain(..self.durations_ms.len() - MAX_DURATION_SAMPLES);
        }
    }

    pub fn count(&self, reason: TerminalReason) -> u64 {
        self.terminal_reasons.get(&reason).copied().unwrap_or(0)
    }

    /// Fraction of sessions ending in success (0.0–1.0).
    pub fn success_rate(&self) -> f64 {
        if self.total_sessions == 0 {
            return 0.0;
        }
        self.count(TerminalReason::Success) as f64 / self.total_sessions as f64
    }

    /// Mean attempts per session (first attempt plus retries).
    pub fn mean_attempts(&self) -> f64 {
        if self.total_sessions == 0 {
            return 0.0;
        }
        (self.total_sessions + self.total_retries) as f64 / self.total_sessions as f64
    }

    pub fn avg_duration(&self) -> Duration {
        if self.durations_ms.is_empty() {
            return Duration::ZERO;
        }
        let sum: u64 = self.durations_ms.iter().sum();
        Duration::from_millis(sum / self.durations_ms.len() as u64)
    }
}
