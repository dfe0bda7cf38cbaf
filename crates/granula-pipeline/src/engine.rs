//! AdaptiveEngine: drives one question through the retrieve → generate →
//! evaluate → retry state machine.
//!
//! Route: classify the question into partitions and pick the starting tier.
//! Each attempt: retrieve at the current tier, filter, generate, evaluate,
//! then either stop, dispatch the generated query, or pick a new tier and retry.

use std::sync::Arc;
use std::time::Instant;

use serde_json::json;
use tracing::{debug, info, Instrument};

use granula_core::config::GranulaConfig;
use granula_core::errors::{ConfigError, GranulaError, GranulaResult};
use granula_core::models::{
    AnswerOutcome, GenerationKind, GranularityHistory, LoopState, PartitionId, QueryExecution,
    SessionState, TerminalReason, TierId, TierLadder,
};
use granula_core::traits::{
    AnswerGenerator, GranularEvaluator, GroundednessChecker, InsufficiencyDetector, Interpreter,
    MetricsSink, NoopMetricsSink, QueryExecutor, QuestionRewriter, RelevanceGrader,
    RetrievalService,
};
use granula_core::CancellationToken;
use granula_granularity::{DomainLexicon, GranularityAnalyzer, GranularityController};
use granula_observability::metrics::events;
use granula_observability::tracing_setup::events as log_events;
use granula_observability::{attempt_span, session_span};
use granula_routing::{PartitionCatalog, QueryClassifier};

use crate::cancel::{cancelled, race};
use crate::evaluation::EvaluationStage;
use crate::filter::RelevanceFilter;
use crate::generation::GenerationStage;
use crate::insufficiency::PhraseInsufficiencyDetector;
use crate::query_branch::QueryBranch;
use crate::retrieval::{RetrievalAggregator, RetrievalRequest};
use crate::termination::{self, AttemptSummary, LoopDecision};

/// The adaptive answering engine.
///
/// Holds no per-question state: share one instance (behind an `Arc`) across
/// any number of concurrent sessions.
pub struct AdaptiveEngine {
    config: GranulaConfig,
    classifier: QueryClassifier,
    analyzer: GranularityAnalyzer,
    controller: GranularityController,
    retrieval: RetrievalAggregator,
    filter: RelevanceFilter,
    generation: GenerationStage,
    evaluation: EvaluationStage,
    query_branch: QueryBranch,
    rewriter: Option<Arc<dyn QuestionRewriter>>,
    insufficiency: Arc<dyn InsufficiencyDetector>,
    metrics: Arc<dyn MetricsSink>,
    /// Partitions this engine may route to. Empty means the whole catalog.
    available: Vec<PartitionId>,
}

impl AdaptiveEngine {
    pub fn builder(config: GranulaConfig) -> AdaptiveEngineBuilder {
        AdaptiveEngineBuilder::new(config)
    }

    pub fn config(&self) -> &GranulaConfig {
        &self.config
    }

    pub fn ladder(&self) -> &TierLadder {
        self.analyzer.ladder()
    }

    pub fn catalog(&self) -> &PartitionCatalog {
        self.classifier.catalog()
    }

    /// Answer `question`. Collaborator failures degrade inside the loop;
    /// the only error a caller sees here is cancellation.
    pub async fn answer(&self, question: &str) -> GranulaResult<AnswerOutcome> {
        self.answer_with_cancellation(question, &CancellationToken::new())
            .await
    }

    /// Answer `question`, stopping at the next await point once `token` fires.
    pub async fn answer_with_cancellation(
        &self,
        question: &str,
        token: &CancellationToken,
    ) -> GranulaResult<AnswerOutcome> {
        let result = self
            .run_session(question, token)
            .instrument(session_span!(question))
            .await;

        if let Err(GranulaError::Cancelled { stage }) = &result {
            info!(stage = %stage, "session cancelled");
            self.metrics
                .record(events::SESSION_CANCELLED, &json!({ "stage": stage }));
        }
        result
    }

    async fn run_session(
        &self,
        question: &str,
        token: &CancellationToken,
    ) -> GranulaResult<AnswerOutcome> {
        let started = Instant::now();
        if token.is_cancelled() {
            return Err(cancelled(LoopState::Route.as_str()));
        }

        // Step 1: Route.
        let classification = self.classifier.classify(question, &self.available);
        let initial = self.initial_tier(question);
        debug!(
            partitions = classification.partitions.len(),
            method = ?classification.method,
            tier = %initial,
            "question routed"
        );
        self.metrics.record(
            events::SESSION_STARTED,
            &json!({
                "partitions": classification.partitions.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
                "method": classification.method,
                "tier": initial.as_str(),
            }),
        );

        let mut session = SessionState::new(question, initial, self.config.retry.max_history);
        session.set_partitions(classification.partitions, classification.matched_scope);

        loop {
            if token.is_cancelled() {
                return Err(cancelled(LoopState::Retrieve.as_str()));
            }

            let span = attempt_span!(session.retry_count(), session.granularity());
            let decision = self.attempt(&mut session, token).instrument(span).await?;

            match decision {
                LoopDecision::Retry => self.schedule_retry(&mut session, token).await?,
                LoopDecision::DispatchQuery => {
                    session.transition(LoopState::DispatchQuery)?;
                    let query = session
                        .generation()
                        .map(|g| g.text().to_string())
                        .unwrap_or_default();
                    let execution = self.query_branch.execute(&query, token).await?;
                    session.set_terminal(TerminalReason::SqlDispatched)?;
                    session.transition(LoopState::Done)?;
                    return self.finish(session, Some(execution), started);
                }
                LoopDecision::Done(reason) => {
                    session.set_terminal(reason)?;
                    session.transition(LoopState::Done)?;
                    return self.finish(session, None, started);
                }
            }
        }
    }

    /// One retrieve → evaluate pass at the session's current tier.
    async fn attempt(
        &self,
        session: &mut SessionState,
        token: &CancellationToken,
    ) -> GranulaResult<LoopDecision> {
        session.transition(LoopState::Retrieve)?;

        // Step 2: Retrieve across the selected partitions.
        let retrieved = {
            let request = RetrievalRequest {
                question: session.effective_question(),
                partitions: session.selected_partitions(),
                tier: session.granularity(),
                retry_count: session.retry_count(),
                already_searched: session.searched_partitions(),
                available: &self.available,
            };
            self.retrieval.retrieve(request, token).await?
        };
        session.mark_searched(&retrieved.searched);
        if let Some(widened) = retrieved.widened_to {
            session.replace_partitions(widened);
        }

        // Step 3: Filter.
        session.transition(LoopState::Filter)?;
        let filtered = self
            .filter
            .filter(retrieved.documents, session.effective_question(), token)
            .await?;
        session.replace_documents(filtered.documents);

        // Step 4: Generate.
        session.transition(LoopState::Generate)?;
        let generated = self
            .generation
            .generate(session.effective_question(), session.documents(), token)
            .await?;
        session.replace_generation(generated.generation.clone());

        // Step 5: Evaluate against the original question.
        session.transition(LoopState::Evaluate)?;
        let verdict = if generated.failed {
            self.evaluation.skipped()
        } else {
            self.evaluation
                .evaluate(session.question(), session.documents(), &generated.generation, token)
                .await?
        };

        let kind = generated.generation.kind();
        let text = generated.generation.text();
        let insufficient =
            kind == GenerationKind::Answer && self.insufficiency.is_insufficient(text);

        // Step 6: Grounded answers may end the loop early.
        let mut passed = verdict.passed;
        if !passed
            && !generated.failed
            && !insufficient
            && kind == GenerationKind::Answer
            && !text.trim().is_empty()
            && self.config.retry.grounded_short_circuit
            && self.generation.has_checker()
            && self
                .generation
                .is_grounded(session.question(), session.documents(), text, token)
                .await?
        {
            info!(
                retry_count = session.retry_count(),
                tier = %session.granularity(),
                "answer grounded, accepting despite scores"
            );
            self.metrics.record(
                events::GROUNDED_SHORT_CIRCUIT,
                &json!({
                    "retry_count": session.retry_count(),
                    "tier": session.granularity().as_str(),
                }),
            );
            passed = true;
        }

        session.replace_evaluation(verdict.scores, passed);
        self.metrics.record(
            events::ATTEMPT_EVALUATED,
            &json!({
                "retry_count": session.retry_count(),
                "tier": session.granularity().as_str(),
                "kind": kind,
                "passed": passed,
                "failing": verdict.failing.iter().map(|d| d.to_string()).collect::<Vec<_>>(),
                "scores": verdict.scores,
                "documents": session.documents().len(),
            }),
        );

        Ok(termination::decide(AttemptSummary {
            kind,
            passed,
            insufficient,
            retry_count: session.retry_count(),
            max_retries: self.config.retry.max_retries,
        }))
    }

    /// Pick the next tier and move the session into its next attempt.
    async fn schedule_retry(
        &self,
        session: &mut SessionState,
        token: &CancellationToken,
    ) -> GranulaResult<()> {
        session.transition(LoopState::Retry)?;

        let analysis = self.analyzer.analyze(session.question(), session.history());
        let scores = session.evaluation().copied().unwrap_or_default();
        let current = session.granularity().clone();
        let decision = self.controller.next_tier(
            &current,
            &scores,
            self.evaluation.thresholds(),
            &analysis,
            session.history(),
        );

        let next_retry = session.retry_count() + 1;
        log_events::retry_scheduled(
            current.as_str(),
            decision.tier.as_str(),
            decision.rule.as_str(),
            next_retry,
        );
        self.metrics.record(
            events::RETRY_SCHEDULED,
            &json!({
                "from": current.as_str(),
                "to": decision.tier.as_str(),
                "rule": decision.rule.as_str(),
                "guarded": decision.guarded,
                "confidence": analysis.confidence,
                "retry_count": next_retry,
            }),
        );
        session.begin_retry(decision.tier);

        if session.retry_count() == 1 {
            self.rewrite(session, token).await?;
        }
        Ok(())
    }

    async fn rewrite(&self, session: &mut SessionState, token: &CancellationToken) -> GranulaResult<()> {
        let Some(rewriter) = &self.rewriter else {
            return Ok(());
        };

        match race(token, "rewrite", rewriter.rewrite(session.question())).await? {
            Ok(text) if !text.trim().is_empty() => {
                let text = text.trim().to_string();
                if session.set_rewritten_question(text.clone()) {
                    info!(rewritten = %text, "question rewritten");
                    self.metrics
                        .record(events::QUESTION_REWRITTEN, &json!({ "rewritten": text }));
                }
            }
            Ok(_) => debug!("rewriter returned nothing, keeping the original question"),
            Err(e) => log_events::degraded("rewriter", &e.to_string(), "original question"),
        }
        Ok(())
    }

    fn initial_tier(&self, question: &str) -> TierId {
        match &self.config.granularity.initial_tier {
            Some(tier) => TierId::new(tier.clone()),
            None => {
                self.analyzer
                    .analyze(question, &GranularityHistory::default())
                    .recommended
            }
        }
    }

    fn finish(
        &self,
        session: SessionState,
        query_execution: Option<QueryExecution>,
        started: Instant,
    ) -> GranulaResult<AnswerOutcome> {
        let outcome = session.into_outcome(query_execution)?;
        log_events::session_completed(&outcome);
        self.metrics.record(
            events::SESSION_COMPLETED,
            &json!({
                "terminal_reason": outcome.terminal_reason,
                "retry_count": outcome.retry_count,
                "final_tier": outcome.final_tier.as_str(),
                "duration_ms": started.elapsed().as_millis() as u64,
            }),
        );
        Ok(outcome)
    }
}

/// Assembles an [`AdaptiveEngine`] from config and collaborators.
///
/// Catalog, retrieval service, grader, generator, and evaluator are required.
/// Everything else is optional.
pub struct AdaptiveEngineBuilder {
    config: GranulaConfig,
    catalog: Option<Arc<PartitionCatalog>>,
    retrieval: Option<Arc<dyn RetrievalService>>,
    grader: Option<Arc<dyn RelevanceGrader>>,
    generator: Option<Arc<dyn AnswerGenerator>>,
    evaluator: Option<Arc<dyn GranularEvaluator>>,
    executor: Option<Arc<dyn QueryExecutor>>,
    interpreter: Option<Arc<dyn Interpreter>>,
    checker: Option<Arc<dyn GroundednessChecker>>,
    rewriter: Option<Arc<dyn QuestionRewriter>>,
    insufficiency: Option<Arc<dyn InsufficiencyDetector>>,
    metrics: Arc<dyn MetricsSink>,
    available: Vec<PartitionId>,
}

impl AdaptiveEngineBuilder {
    pub fn new(config: GranulaConfig) -> Self {
        Self {
            config,
            catalog: None,
            retrieval: None,
            grader: None,
            generator: None,
            evaluator: None,
            executor: None,
            interpreter: None,
            checker: None,
            rewriter: None,
            insufficiency: None,
            metrics: Arc::new(NoopMetricsSink),
            available: Vec::new(),
        }
    }

    pub fn with_catalog(mut self, catalog: Arc<PartitionCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_retrieval(mut self, retrieval: Arc<dyn RetrievalService>) -> Self {
        self.retrieval = Some(retrieval);
        self
    }

    pub fn with_grader(mut self, grader: Arc<dyn RelevanceGrader>) -> Self {
        self.grader = Some(grader);
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn AnswerGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_evaluator(mut self, evaluator: Arc<dyn GranularEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn with_executor(mut self, executor: Arc<dyn QueryExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn with_interpreter(mut self, interpreter: Arc<dyn Interpreter>) -> Self {
        self.interpreter = Some(interpreter);
        self
    }

    pub fn with_groundedness_checker(mut self, checker: Arc<dyn GroundednessChecker>) -> Self {
        self.checker = Some(checker);
        self
    }

    pub fn with_rewriter(mut self, rewriter: Arc<dyn QuestionRewriter>) -> Self {
        self.rewriter = Some(rewriter);
        self
    }

    /// Replace the default phrase-based insufficiency detector.
    pub fn with_insufficiency_detector(mut self, detector: Arc<dyn InsufficiencyDetector>) -> Self {
        self.insufficiency = Some(detector);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Restrict routing to these partitions. Empty means the whole catalog.
    pub fn with_available_partitions(mut self, partitions: Vec<PartitionId>) -> Self {
        self.available = partitions;
        self
    }

    pub fn build(self) -> GranulaResult<AdaptiveEngine> {
        let Self {
            config,
            catalog,
            retrieval,
            grader,
            generator,
            evaluator,
            executor,
            interpreter,
            checker,
            rewriter,
            insufficiency,
            metrics,
            available,
        } = self;

        config.validate()?;
        let catalog = required(catalog, "catalog")?;
        let retrieval = required(retrieval, "retrieval")?;
        let grader = required(grader, "grader")?;
        let generator = required(generator, "generator")?;
        let evaluator = required(evaluator, "evaluator")?;

        if let Some(unknown) = available.iter().find(|p| catalog.partition(p).is_none()) {
            return Err(ConfigError::ValidationFailed {
                field: "available_partitions".to_string(),
                message: format!("partition {unknown} is not in the catalog"),
            }
            .into());
        }

        let insufficiency: Arc<dyn InsufficiencyDetector> = match insufficiency {
            Some(detector) => detector,
            None => Arc::new(PhraseInsufficiencyDetector::new()),
        };
        let ladder = TierLadder::new(&config.granularity.tiers)?;
        let lexicon = DomainLexicon::from_catalog(&catalog, &config.granularity.acronyms);

        Ok(AdaptiveEngine {
            classifier: QueryClassifier::new(Arc::clone(&catalog)),
            analyzer: GranularityAnalyzer::new(ladder.clone(), lexicon),
            controller: GranularityController::new(ladder.clone()),
            retrieval: RetrievalAggregator::new(
                retrieval,
                catalog,
                ladder,
                config.retry.per_partition_limit,
                config.retry.max_documents,
                Arc::clone(&metrics),
            ),
            filter: RelevanceFilter::new(grader, Arc::clone(&metrics)),
            generation: GenerationStage::new(generator, checker, Arc::clone(&metrics)),
            evaluation: EvaluationStage::new(evaluator, config.thresholds.clone(), Arc::clone(&metrics)),
            query_branch: QueryBranch::new(
                executor,
                interpreter,
                config.retry.interpret_query_results,
                Arc::clone(&metrics),
            ),
            rewriter,
            insufficiency,
            metrics,
            available,
            config,
        })
    }
}

fn required<T: ?Sized>(value: Option<Arc<T>>, name: &str) -> GranulaResult<Arc<T>> {
    value.ok_or_else(|| {
        ConfigError::ValidationFailed {
            field: name.to_string(),
            message: "collaborator is required".to_string(),
        }
        .into()
    })
}
