use serde::{Deserialize, Serialize};

use super::defaults;

/// Retry-loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Retries allowed beyond the first attempt.
    pub max_retries: u32,
    /// Cap on documents kept per retrieval round.
    pub max_documents: usize,
    /// Results requested from each partition.
    pub per_partition_limit: usize,
    /// Granularity history length.
    pub max_history: usize,
    /// Turn query results into prose via the interpreter when one is configured.
    pub interpret_query_results: bool,
    /// Let passing groundedness checks end the loop with success.
    pub grounded_short_circuit: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_retries: defaults::DEFAULT_MAX_RETRIES,
            max_documents: defaults::DEFAULT_MAX_DOCUMENTS,
            per_partition_limit: defaults::DEFAULT_PER_PARTITION_LIMIT,
            max_history: defaults::DEFAULT_MAX_HISTORY,
            interpret_query_results: defaults::DEFAULT_INTERPRET_QUERY_RESULTS,
            grounded_short_circuit: defaults::DEFAULT_GROUNDED_SHORT_CIRCUIT,
        }
    }
}

impl LoopConfig {
    /// Total attempts the loop may make (first attempt plus retries).
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}
