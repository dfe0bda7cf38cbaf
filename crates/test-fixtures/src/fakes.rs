//! Scripted collaborators.
//!
//! Every fake records what it was asked so tests can assert on the calls the
//! engine made. Scripted sequences repeat their last entry once exhausted.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use granula_core::errors::ServiceError;
use granula_core::models::{
    Document, EvaluationScores, Generation, PartitionId, RawGeneration, TabularResult, TierId,
};
use granula_core::traits::{
    AnswerGenerator, GranularEvaluator, GroundednessChecker, Interpreter, QueryExecutor,
    QuestionRewriter, RelevanceGrader, RetrievalService, SearchRequest,
};
use tokio::sync::Notify;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Scores above every default threshold.
pub fn passing_scores() -> EvaluationScores {
    EvaluationScores::new(0.9, 0.9, 0.9, 0.9)
}

/// Scores failing only context recall.
pub fn low_recall_scores() -> EvaluationScores {
    EvaluationScores::new(0.9, 0.9, 0.4, 0.9)
}

/// Scores failing every dimension.
pub fn failing_scores() -> EvaluationScores {
    EvaluationScores::new(0.2, 0.2, 0.2, 0.2)
}

// ── Retrieval ──────────────────────────────────────────────────────────────

/// Serves fixed documents per partition.
#[derive(Debug, Default)]
pub struct ScriptedRetrieval {
    documents: HashMap<PartitionId, Vec<String>>,
    failing: HashSet<PartitionId>,
    empty_tiers: HashSet<TierId>,
    requests: Mutex<Vec<SearchRequest>>,
}

impl ScriptedRetrieval {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(mut self, partition: &str, texts: &[&str]) -> Self {
        self.documents.insert(
            partition.into(),
            texts.iter().map(|t| (*t).to_string()).collect(),
        );
        self
    }

    /// Every search against `partition` fails.
    pub fn failing(mut self, partition: &str) -> Self {
        self.failing.insert(partition.into());
        self
    }

    /// Every search at `tier` returns nothing.
    pub fn empty_at(mut self, tier: &str) -> Self {
        self.empty_tiers.insert(tier.into());
        self
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        lock(&self.requests).clone()
    }

    /// Partitions searched, in call order, without repeats.
    pub fn searched_partitions(&self) -> Vec<PartitionId> {
        let mut out: Vec<PartitionId> = Vec::new();
        for r in lock(&self.requests).iter() {
            if !out.contains(&r.partition) {
                out.push(r.partition.clone());
            }
        }
        out
    }
}

#[async_trait]
impl RetrievalService for ScriptedRetrieval {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Document>, ServiceError> {
        lock(&self.requests).push(request.clone());
        if self.failing.contains(&request.partition) {
            return Err(ServiceError::unavailable(
                "retrieval",
                format!("partition {} offline", request.partition),
            ));
        }
        if self.empty_tiers.contains(&request.tier) {
            return Ok(Vec::new());
        }
        let texts = self
            .documents
            .get(&request.partition)
            .cloned()
            .unwrap_or_default();
        Ok(texts
            .into_iter()
            .take(request.limit)
            .map(|text| {
                let mut doc = Document::new(text);
                doc.metadata
                    .insert("chunk_size".into(), request.chunk_size.into());
                doc
            })
            .collect())
    }
}

// ── Grading ────────────────────────────────────────────────────────────────

/// Accepts every document unless its text contains a rejection marker.
#[derive(Debug, Default)]
pub struct MarkerGrader {
    reject: Vec<String>,
    fail: Vec<String>,
    questions: Mutex<Vec<String>>,
}

impl MarkerGrader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(mut self, marker: &str) -> Self {
        self.reject.push(marker.to_string());
        self
    }

    /// Grading a document containing `marker` fails.
    pub fn failing_on(mut self, marker: &str) -> Self {
        self.fail.push(marker.to_string());
        self
    }

    pub fn questions(&self) -> Vec<String> {
        lock(&self.questions).clone()
    }
}

#[async_trait]
impl RelevanceGrader for MarkerGrader {
    async fn grade(&self, text: &str, question: &str) -> Result<bool, ServiceError> {
        lock(&self.questions).push(question.to_string());
        if self.fail.iter().any(|m| text.contains(m.as_str())) {
            return Err(ServiceError::unavailable("grader", "timeout"));
        }
        Ok(!self.reject.iter().any(|m| text.contains(m.as_str())))
    }
}

// ── Generation ─────────────────────────────────────────────────────────────

/// Returns scripted generations in order.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<RawGeneration, ServiceError>>>,
    last: Mutex<Option<Result<RawGeneration, ServiceError>>>,
    questions: Mutex<Vec<String>>,
    context_sizes: Mutex<Vec<usize>>,
}

impl ScriptedGenerator {
    pub fn new(script: Vec<Result<RawGeneration, ServiceError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    /// Prose answers, one per attempt.
    pub fn answers(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(RawGeneration::answer(*t))).collect())
    }

    pub fn always(generation: RawGeneration) -> Self {
        Self::new(vec![Ok(generation)])
    }

    pub fn calls(&self) -> usize {
        lock(&self.questions).len()
    }

    pub fn questions(&self) -> Vec<String> {
        lock(&self.questions).clone()
    }

    /// Number of documents passed on each call.
    pub fn context_sizes(&self) -> Vec<usize> {
        lock(&self.context_sizes).clone()
    }
}

#[async_trait]
impl AnswerGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        question: &str,
        context: &[Document],
    ) -> Result<RawGeneration, ServiceError> {
        lock(&self.questions).push(question.to_string());
        lock(&self.context_sizes).push(context.len());
        let next = lock(&self.script).pop_front();
        let mut last = lock(&self.last);
        if let Some(n) = next {
            *last = Some(n);
        }
        last.clone().unwrap_or_else(|| Ok(RawGeneration::answer("")))
    }
}

/// Never finishes generating. Signals when it has been entered.
#[derive(Debug, Default)]
pub struct PendingGenerator {
    started: Notify,
}

impl PendingGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves once `generate` has been called.
    pub async fn wait_started(&self) {
        self.started.notified().await;
    }
}

#[async_trait]
impl AnswerGenerator for PendingGenerator {
    async fn generate(
        &self,
        _question: &str,
        _context: &[Document],
    ) -> Result<RawGeneration, ServiceError> {
        self.started.notify_one();
        std::future::pending().await
    }
}

/// Fixed groundedness verdicts.
#[derive(Debug)]
pub struct FixedGroundedness {
    grounded: Result<bool, ServiceError>,
    addresses: bool,
    calls: AtomicUsize,
}

impl FixedGroundedness {
    pub fn new(grounded: bool, addresses: bool) -> Self {
        Self {
            grounded: Ok(grounded),
            addresses,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            grounded: Err(ServiceError::unavailable("groundedness", "model offline")),
            addresses: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GroundednessChecker for FixedGroundedness {
    async fn is_grounded(&self, _context: &[Document], _answer: &str) -> Result<bool, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.grounded.clone()
    }

    async fn addresses_question(
        &self,
        _question: &str,
        _answer: &str,
    ) -> Result<bool, ServiceError> {
        Ok(self.addresses)
    }
}

// ── Evaluation ─────────────────────────────────────────────────────────────

/// Returns scripted scores in order.
#[derive(Debug, Default)]
pub struct ScriptedEvaluator {
    script: Mutex<VecDeque<Result<EvaluationScores, ServiceError>>>,
    last: Mutex<Option<Result<EvaluationScores, ServiceError>>>,
    questions: Mutex<Vec<String>>,
    generations: Mutex<Vec<Generation>>,
}

impl ScriptedEvaluator {
    pub fn new(script: Vec<Result<EvaluationScores, ServiceError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    pub fn scores(scores: &[EvaluationScores]) -> Self {
        Self::new(scores.iter().map(|s| Ok(*s)).collect())
    }

    pub fn failing() -> Self {
        Self::new(vec![Err(ServiceError::unavailable("evaluator", "judge offline"))])
    }

    pub fn calls(&self) -> usize {
        lock(&self.questions).len()
    }

    pub fn questions(&self) -> Vec<String> {
        lock(&self.questions).clone()
    }

    pub fn generations(&self) -> Vec<Generation> {
        lock(&self.generations).clone()
    }
}

#[async_trait]
impl GranularEvaluator for ScriptedEvaluator {
    async fn evaluate(
        &self,
        question: &str,
        _context: &[Document],
        generation: &Generation,
    ) -> Result<EvaluationScores, ServiceError> {
        lock(&self.questions).push(question.to_string());
        lock(&self.generations).push(generation.clone());
        let next = lock(&self.script).pop_front();
        let mut last = lock(&self.last);
        if let Some(n) = next {
            *last = Some(n);
        }
        last.clone().unwrap_or_else(|| Ok(EvaluationScores::zero()))
    }
}

// ── Query branch ───────────────────────────────────────────────────────────

/// Returns a fixed result for every query.
#[derive(Debug)]
pub struct ScriptedExecutor {
    result: Result<TabularResult, ServiceError>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    pub fn returning(result: TabularResult) -> Self {
        Self {
            result: Ok(result),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            result: Err(ServiceError::Rejected {
                service: "query_executor".to_string(),
                reason: reason.to_string(),
            }),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        lock(&self.queries).clone()
    }
}

#[async_trait]
impl QueryExecutor for ScriptedExecutor {
    async fn run(&self, query: &str) -> Result<TabularResult, ServiceError> {
        lock(&self.queries).push(query.to_string());
        self.result.clone()
    }
}

/// Returns a fixed interpretation.
#[derive(Debug)]
pub struct ScriptedInterpreter {
    result: Result<String, ServiceError>,
    calls: AtomicUsize,
}

impl ScriptedInterpreter {
    pub fn explaining(text: &str) -> Self {
        Self {
            result: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err(ServiceError::unavailable("interpreter", "model offline")),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Interpreter for ScriptedInterpreter {
    async fn explain(&self, _query: &str, _result: &TabularResult) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

// ── Rewriting ──────────────────────────────────────────────────────────────

/// Rewrites every question to the same text.
#[derive(Debug)]
pub struct FixedRewriter {
    result: Result<String, ServiceError>,
    calls: AtomicUsize,
}

impl FixedRewriter {
    pub fn new(rewritten: &str) -> Self {
        Self {
            result: Ok(rewritten.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err(ServiceError::unavailable("rewriter", "model offline")),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuestionRewriter for FixedRewriter {
    async fn rewrite(&self, _question: &str) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}
