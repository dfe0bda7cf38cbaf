//! Structured-query dispatch and optional interpretation.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, Instrument};

use granula_core::errors::GranulaResult;
use granula_core::models::QueryExecution;
use granula_core::traits::{Interpreter, MetricsSink, QueryExecutor};
use granula_core::CancellationToken;
use granula_observability::metrics::events;
use granula_observability::query_span;
use granula_observability::tracing_setup::events as log_events;

use crate::cancel::race;

const NO_EXECUTOR: &str = "no query executor configured";

/// Sends generated queries to the relational store.
pub struct QueryBranch {
    executor: Option<Arc<dyn QueryExecutor>>,
    interpreter: Option<Arc<dyn Interpreter>>,
    interpret: bool,
    metrics: Arc<dyn MetricsSink>,
}

impl QueryBranch {
    pub fn new(
        executor: Option<Arc<dyn QueryExecutor>>,
        interpreter: Option<Arc<dyn Interpreter>>,
        interpret: bool,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            executor,
            interpreter,
            interpret,
            metrics,
        }
    }

    /// Run `query` verbatim. Execution failures end up in
    /// [`QueryExecution::error`]; only cancellation is an `Err`.
    pub async fn execute(&self, query: &str, token: &CancellationToken) -> GranulaResult<QueryExecution> {
        self.execute_inner(query, token)
            .instrument(query_span!(query))
            .await
    }

    async fn execute_inner(&self, query: &str, token: &CancellationToken) -> GranulaResult<QueryExecution> {
        self.metrics
            .record(events::QUERY_DISPATCHED, &json!({ "query": query }));

        let mut execution = QueryExecution {
            query: query.to_string(),
            result: None,
            error: None,
            interpretation: None,
        };

        let Some(executor) = &self.executor else {
            log_events::degraded("query_executor", NO_EXECUTOR, "error text as answer");
            self.metrics
                .record(events::QUERY_FAILED, &json!({ "reason": NO_EXECUTOR }));
            execution.error = Some(NO_EXECUTOR.to_string());
            return Ok(execution);
        };

        let result = match race(token, "query", executor.run(query)).await? {
            Ok(result) => result,
            Err(e) => {
                let reason = format!("query execution failed: {e}");
                log_events::degraded("query_executor", &e.to_string(), "error text as answer");
                self.metrics
                    .record(events::QUERY_FAILED, &json!({ "reason": e.to_string() }));
                execution.error = Some(reason);
                return Ok(execution);
            }
        };
        debug!(
            columns = result.columns.len(),
            rows = result.rows.len(),
            "query executed"
        );

        if self.interpret {
            if let Some(interpreter) = &self.interpreter {
                match race(token, "interpret", interpreter.explain(query, &result)).await? {
                    Ok(text) => execution.interpretation = Some(text),
                    Err(e) => {
                        log_events::degraded("interpreter", &e.to_string(), "rendered table");
                        self.metrics
                            .record(events::INTERPRETATION_FAILED, &json!({ "reason": e.to_string() }));
                    }
                }
            }
        }

        execution.result = Some(result);
        Ok(execution)
    }
}
