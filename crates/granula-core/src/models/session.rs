//! Per-question session state and the loop state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{GranulaError, GranulaResult};

use super::{
    AnswerOutcome, Document, EvaluationScores, Generation, GranularityHistory, HistoryEntry,
    PartitionId, QueryExecution, ScopeId, TierId,
};

/// Why a session stopped looping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalReason {
    Success,
    MaxRetries,
    InsufficientInfo,
    SqlDispatched,
}

impl TerminalReason {
    pub const ALL: [TerminalReason; 4] = [
        Self::Success,
        Self::MaxRetries,
        Self::InsufficientInfo,
        Self::SqlDispatched,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::MaxRetries => "max_retries",
            Self::InsufficientInfo => "insufficient_info",
            Self::SqlDispatched => "sql_dispatched",
        }
    }
}

impl fmt::Display for TerminalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nodes of the retry loop.
///
/// ```text
/// Route → Retrieve → Filter → Generate → Evaluate ─┬→ Done
///            ↑                                      ├→ DispatchQuery → Done
///            └──────────────── Retry ←──────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    Route,
    Retrieve,
    Filter,
    Generate,
    Evaluate,
    Retry,
    DispatchQuery,
    Done,
}

impl LoopState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Route => "route",
            Self::Retrieve => "retrieve",
            Self::Filter => "filter",
            Self::Generate => "generate",
            Self::Evaluate => "evaluate",
            Self::Retry => "retry",
            Self::DispatchQuery => "dispatch_query",
            Self::Done => "done",
        }
    }

    pub fn can_transition_to(&self, next: LoopState) -> bool {
        use LoopState::*;
        matches!(
            (self, next),
            (Route, Retrieve)
                | (Retrieve, Filter)
                | (Filter, Generate)
                | (Generate, Evaluate)
                | (Evaluate, Retry)
                | (Evaluate, DispatchQuery)
                | (Evaluate, Done)
                | (Retry, Retrieve)
                | (DispatchQuery, Done)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of one in-flight question.
///
/// Mutated only through the methods below, in pipeline order. `question`
/// never changes, `rewritten_question` and `terminal_reason` are set at most
/// once, and `retry_count` only grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    question: String,
    rewritten_question: Option<String>,
    selected_partitions: Vec<PartitionId>,
    searched_partitions: Vec<PartitionId>,
    matched_scope: Option<ScopeId>,
    documents: Vec<Document>,
    generation: Option<Generation>,
    evaluation: Option<EvaluationScores>,
    /// `retry_count` of the attempt `evaluation` belongs to.
    evaluated_attempt: Option<u32>,
    evaluation_passed: bool,
    granularity: TierId,
    granularity_history: GranularityHistory,
    retry_count: u32,
    terminal_reason: Option<TerminalReason>,
    state: LoopState,
}

impl SessionState {
    pub fn new(question: impl Into<String>, granularity: TierId, max_history: usize) -> Self {
        Self {
            question: question.into(),
            rewritten_question: None,
            selected_partitions: Vec::new(),
            searched_partitions: Vec::new(),
            matched_scope: None,
            documents: Vec::new(),
            generation: None,
            evaluation: None,
            evaluated_attempt: None,
            evaluation_passed: false,
            granularity,
            granularity_history: GranularityHistory::new(max_history),
            retry_count: 0,
            terminal_reason: None,
            state: LoopState::Route,
        }
    }

    // --- Accessors ---

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn rewritten_question(&self) -> Option<&str> {
        self.rewritten_question.as_deref()
    }

    /// Rewritten question when present, otherwise the original.
    pub fn effective_question(&self) -> &str {
        self.rewritten_question.as_deref().unwrap_or(&self.question)
    }

    pub fn selected_partitions(&self) -> &[PartitionId] {
        &self.selected_partitions
    }

    pub fn searched_partitions(&self) -> &[PartitionId] {
        &self.searched_partitions
    }

    pub fn matched_scope(&self) -> Option<&ScopeId> {
        self.matched_scope.as_ref()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn generation(&self) -> Option<&Generation> {
        self.generation.as_ref()
    }

    pub fn evaluation(&self) -> Option<&EvaluationScores> {
        self.evaluation.as_ref()
    }

    pub fn granularity(&self) -> &TierId {
        &self.granularity
    }

    pub fn history(&self) -> &GranularityHistory {
        &self.granularity_history
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn terminal_reason(&self) -> Option<TerminalReason> {
        self.terminal_reason
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    // --- Mutators ---

    /// Set the rewritten question. Returns false if one was already set.
    pub fn set_rewritten_question(&mut self, rewritten: impl Into<String>) -> bool {
        if self.rewritten_question.is_some() {
            return false;
        }
        self.rewritten_question = Some(rewritten.into());
        true
    }

    pub fn set_partitions(&mut self, partitions: Vec<PartitionId>, scope: Option<ScopeId>) {
        self.selected_partitions = partitions;
        self.matched_scope = scope;
    }

    /// Replace the selected partitions after a fallback widening; scope is kept.
    pub fn replace_partitions(&mut self, partitions: Vec<PartitionId>) {
        self.selected_partitions = partitions;
    }

    /// Remember that `partitions` were queried in this session.
    pub fn mark_searched<'a>(&mut self, partitions: impl IntoIterator<Item = &'a PartitionId>) {
        for p in partitions {
            if !self.searched_partitions.contains(p) {
                self.searched_partitions.push(p.clone());
            }
        }
    }

    pub fn replace_documents(&mut self, documents: Vec<Document>) {
        self.documents = documents;
    }

    pub fn replace_generation(&mut self, generation: Generation) {
        self.generation = Some(generation);
    }

    /// Store this attempt's evaluation and whether it counts as a success,
    /// then log the attempt.
    pub fn replace_evaluation(&mut self, evaluation: EvaluationScores, passed: bool) {
        self.evaluation = Some(evaluation);
        self.evaluated_attempt = Some(self.retry_count);
        self.evaluation_passed = passed;
        self.record_attempt();
    }

    /// Move to the next loop state, rejecting illegal transitions.
    ///
    /// Every transition logs the current attempt into the history when an
    /// evaluation for it exists; the history itself ignores repeats.
    pub fn transition(&mut self, next: LoopState) -> GranulaResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(GranulaError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.record_attempt();
        self.state = next;
        Ok(())
    }

    /// Log the current `(retry_count, tier)` attempt if it has been evaluated.
    /// Returns whether a new entry was added.
    pub fn record_attempt(&mut self) -> bool {
        let Some(evaluation) = self.evaluation else {
            return false;
        };
        if self.evaluated_attempt != Some(self.retry_count) {
            return false;
        }
        self.granularity_history.record(HistoryEntry {
            tier: self.granularity.clone(),
            attempt: self.retry_count,
            evaluation,
            success: self.evaluation_passed,
        })
    }

    /// Start the next attempt at `tier`.
    pub fn begin_retry(&mut self, tier: TierId) {
        self.granularity = tier;
        self.retry_count += 1;
    }

    /// Record the terminal reason. Fails if one was already recorded.
    pub fn set_terminal(&mut self, reason: TerminalReason) -> GranulaResult<()> {
        if let Some(existing) = self.terminal_reason {
            return Err(GranulaError::TerminalReasonAlreadySet {
                existing: existing.to_string(),
            });
        }
        self.terminal_reason = Some(reason);
        Ok(())
    }

    /// Consume the finished session into the caller-facing outcome.
    pub fn into_outcome(self, query_execution: Option<QueryExecution>) -> GranulaResult<AnswerOutcome> {
        let terminal_reason = self.terminal_reason.ok_or_else(|| GranulaError::InvalidTransition {
            from: self.state.to_string(),
            to: LoopState::Done.to_string(),
        })?;

        Ok(AnswerOutcome {
            granularity_history: self.granularity_history.to_vec(),
            question: self.question,
            rewritten_question: self.rewritten_question,
            final_generation: self
                .generation
                .unwrap_or_else(|| Generation::Answer(String::new())),
            terminal_reason,
            retry_count: self.retry_count,
            evaluation: self.evaluation.unwrap_or_default(),
            final_tier: self.granularity,
            selected_partitions: self.selected_partitions,
            matched_scope: self.matched_scope,
            document_count: self.documents.len(),
            query_execution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionState {
        SessionState::new("how many students enrolled in 2023?", "medium".into(), 5)
    }

    fn walk_to_evaluate(s: &mut SessionState) {
        for next in [
            LoopState::Retrieve,
            LoopState::Filter,
            LoopState::Generate,
            LoopState::Evaluate,
        ] {
            s.transition(next).unwrap();
        }
    }

    #[test]
    fn starts_at_route() {
        assert_eq!(session().state(), LoopState::Route);
    }

    #[test]
    fn illegal_transition_is_rejected() {
        let mut s = session();
        let err = s.transition(LoopState::Evaluate).unwrap_err();
        assert!(matches!(err, GranulaError::InvalidTransition { .. }));
    }

    #[test]
    fn done_has_no_successors() {
        for next in [
            LoopState::Route,
            LoopState::Retrieve,
            LoopState::Retry,
            LoopState::Done,
        ] {
            assert!(!LoopState::Done.can_transition_to(next));
        }
    }

    #[test]
    fn rewritten_question_is_set_once() {
        let mut s = session();
        assert!(s.set_rewritten_question("first"));
        assert!(!s.set_rewritten_question("second"));
        assert_eq!(s.effective_question(), "first");
        assert_eq!(s.question(), "how many students enrolled in 2023?");
    }

    #[test]
    fn terminal_reason_is_set_once() {
        let mut s = session();
        s.set_terminal(TerminalReason::Success).unwrap();
        assert!(s.set_terminal(TerminalReason::MaxRetries).is_err());
        assert_eq!(s.terminal_reason(), Some(TerminalReason::Success));
    }

    #[test]
    fn transitions_log_each_attempt_once() {
        let mut s = session();
        walk_to_evaluate(&mut s);
        s.replace_evaluation(EvaluationScores::new(0.1, 0.1, 0.1, 0.1), false);
        s.transition(LoopState::Retry).unwrap();
        assert_eq!(s.history().len(), 1);

        s.begin_retry("coarse".into());
        // The stale evaluation belongs to attempt 0, so nothing new is logged.
        s.transition(LoopState::Retrieve).unwrap();
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.retry_count(), 1);
    }

    #[test]
    fn into_outcome_requires_terminal_reason() {
        let s = session();
        assert!(s.into_outcome(None).is_err());
    }
}
