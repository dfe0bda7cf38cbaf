use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::models::TabularResult;

/// Runs a structured query against the relational store.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn run(&self, query: &str) -> Result<TabularResult, ServiceError>;
}

/// Turns a query and its tabular result into a natural-language summary.
#[async_trait]
pub trait Interpreter: Send + Sync {
    async fn explain(&self, query: &str, result: &TabularResult) -> Result<String, ServiceError>;
}
