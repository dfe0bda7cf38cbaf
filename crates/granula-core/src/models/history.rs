//! Bounded granularity history.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_HISTORY_CEILING;

use super::{EvaluationScores, TierId};

/// One attempt at a given tier and how it went.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub tier: TierId,
    /// The `retry_count` at which the attempt ran.
    pub attempt: u32,
    pub evaluation: EvaluationScores,
    pub success: bool,
}

/// Append-only, capped log of tried tiers.
///
/// Never holds two entries with the same `(attempt, tier)` pair and never
/// grows past its capacity; the oldest entry is dropped first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GranularityHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl GranularityHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_HISTORY_CEILING);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `entry` unless one with the same `(attempt, tier)` exists.
    /// Returns whether the entry was added.
    pub fn record(&mut self, entry: HistoryEntry) -> bool {
        if self
            .entries
            .iter()
            .any(|e| e.attempt == entry.attempt && e.tier == entry.tier)
        {
            return false;
        }
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    /// Recorded failures for `tier`.
    pub fn failures(&self, tier: &TierId) -> usize {
        self.entries
            .iter()
            .filter(|e| &e.tier == tier && !e.success)
            .count()
    }

    pub fn contains_tier(&self, tier: &TierId) -> bool {
        self.entries.iter().any(|e| &e.tier == tier)
    }

    /// Tiers of the `n` most recent entries, newest first.
    pub fn recent_tiers(&self, n: usize) -> Vec<&TierId> {
        self.entries.iter().rev().take(n).map(|e| &e.tier).collect()
    }

    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for GranularityHistory {
    fn default() -> Self {
        Self::new(crate::config::defaults::DEFAULT_MAX_HISTORY)
    }
}
