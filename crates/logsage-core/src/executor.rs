//! QueryExecutor trait definition.
//!
//! The telemetry backend is a pure query executor: a KQL string in, a
//! tabular result or an execution error with diagnostic text out.
//! Implementations live in logsage-infra (e.g., `LogAnalyticsExecutor`).

use std::sync::Arc;

use logsage_types::error::QueryExecutionError;
use logsage_types::query::QueryTable;

/// Trait for analytic query backends.
///
/// The diagnostic text inside [`QueryExecutionError`] is fed verbatim into
/// the repair prompt, so implementations should preserve the backend's own
/// error wording rather than paraphrasing it.
pub trait QueryExecutor: Send + Sync {
    /// Execute a single read-only query and return its primary table.
    fn execute(
        &self,
        query: &str,
    ) -> impl std::future::Future<Output = Result<QueryTable, QueryExecutionError>> + Send;
}

impl<Q: QueryExecutor> QueryExecutor for Arc<Q> {
    async fn execute(&self, query: &str) -> Result<QueryTable, QueryExecutionError> {
        (**self).execute(query).await
    }
}
