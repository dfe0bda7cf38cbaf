use serde::{Deserialize, Serialize};

use super::{
    EvaluationScores, Generation, HistoryEntry, PartitionId, ScopeId, TabularResult,
    TerminalReason, TierId,
};

/// What happened when a structured query was sent to the relational store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryExecution {
    /// Query text exactly as sent.
    pub query: String,
    pub result: Option<TabularResult>,
    /// Descriptive error text when execution failed.
    pub error: Option<String>,
    /// Natural-language summary of `result`, when requested and available.
    pub interpretation: Option<String>,
}

impl QueryExecution {
    /// Text to surface to the caller: interpretation, else the rendered table,
    /// else the error description.
    pub fn display_text(&self) -> String {
        if let Some(text) = &self.interpretation {
            return text.clone();
        }
        if let Some(result) = &self.result {
            return result.render();
        }
        self.error.clone().unwrap_or_default()
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of `answer`: the final generation plus how the loop got there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub question: String,
    pub rewritten_question: Option<String>,
    pub final_generation: Generation,
    pub terminal_reason: TerminalReason,
    pub retry_count: u32,
    pub evaluation: EvaluationScores,
    pub granularity_history: Vec<HistoryEntry>,
    pub final_tier: TierId,
    pub selected_partitions: Vec<PartitionId>,
    pub matched_scope: Option<ScopeId>,
    pub document_count: usize,
    pub query_execution: Option<QueryExecution>,
}

impl AnswerOutcome {
    /// Text to show the user.
    pub fn answer_text(&self) -> String {
        match &self.query_execution {
            Some(exec) => exec.display_text(),
            None => self.final_generation.text().to_string(),
        }
    }

    /// Number of attempts made (first attempt plus retries).
    pub fn attempts(&self) -> u32 {
        self.retry_count + 1
    }
}
