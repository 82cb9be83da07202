//! LogAnalyticsExecutor -- concrete [`QueryExecutor`] over the Log
//! Analytics REST API.
//!
//! Runs a KQL query against a single workspace and returns its primary
//! table. Non-success responses become [`QueryExecutionError`] carrying the
//! service's own diagnostic text; the orchestrator's repair prompt embeds
//! that text verbatim, so nothing is paraphrased here.

use serde::Deserialize;

use logsage_core::executor::QueryExecutor;
use logsage_types::error::QueryExecutionError;
use logsage_types::query::{QueryColumn, QueryTable};

use super::token::CachedTokenCredential;

/// Widest supported query window; relative time filters belong in the
/// query text itself.
const QUERY_TIMESPAN: &str = "P1000D";

/// Log Analytics workspace query executor.
pub struct LogAnalyticsExecutor {
    client: reqwest::Client,
    credential: CachedTokenCredential,
    workspace_id: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    tables: Vec<WireTable>,
}

#[derive(Debug, Deserialize)]
struct WireTable {
    name: String,
    columns: Vec<WireColumn>,
    rows: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct WireColumn {
    name: String,
    #[serde(rename = "type", default)]
    column_type: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: String,
    message: String,
}

impl LogAnalyticsExecutor {
    pub fn new(credential: CachedTokenCredential, workspace_id: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            credential,
            workspace_id: workspace_id.to_string(),
            base_url: "https://api.loganalytics.io".to_string(),
        }
    }

    /// Override the API base URL (tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn url(&self) -> String {
        format!("{}/v1/workspaces/{}/query", self.base_url, self.workspace_id)
    }

    /// Turn a non-success response body into a diagnostic string,
    /// preferring the structured error message when the body parses.
    fn diagnostic_from_body(status: reqwest::StatusCode, body: &str) -> String {
        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(parsed) if !parsed.error.code.is_empty() => {
                format!("{}: {}", parsed.error.code, parsed.error.message)
            }
            Ok(parsed) => parsed.error.message,
            Err(_) => format!("HTTP {status}: {body}"),
        }
    }

    fn table_from_wire(table: WireTable) -> QueryTable {
        QueryTable {
            name: table.name,
            columns: table
                .columns
                .into_iter()
                .map(|c| QueryColumn {
                    name: c.name,
                    column_type: c.column_type,
                })
                .collect(),
            rows: table.rows,
        }
    }
}

impl QueryExecutor for LogAnalyticsExecutor {
    #[tracing::instrument(name = "execute_query", skip_all, fields(workspace = %self.workspace_id))]
    async fn execute(&self, query: &str) -> Result<QueryTable, QueryExecutionError> {
        tracing::debug!(query = %query, "executing query");

        let token = self
            .credential
            .token()
            .await
            .map_err(|e| QueryExecutionError::new(format!("failed to acquire access token: {e}")))?;

        let response = self
            .client
            .post(self.url())
            .bearer_auth(secrecy::ExposeSecret::expose_secret(&token))
            .json(&serde_json::json!({ "query": query, "timespan": QUERY_TIMESPAN }))
            .send()
            .await
            .map_err(|e| QueryExecutionError::new(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QueryExecutionError::new(Self::diagnostic_from_body(
                status, &body,
            )));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| QueryExecutionError::new(format!("failed to parse response: {e}")))?;

        let table = parsed
            .tables
            .into_iter()
            .next()
            .map(Self::table_from_wire)
            .ok_or_else(|| QueryExecutionError::new("response contained no tables"))?;

        tracing::debug!(rows = table.rows.len(), "query returned");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn make_executor() -> LogAnalyticsExecutor {
        LogAnalyticsExecutor::new(
            CachedTokenCredential::new("tenant", "client", SecretString::from("secret")),
            "workspace-123",
        )
    }

    #[test]
    fn test_query_url() {
        assert_eq!(
            make_executor().url(),
            "https://api.loganalytics.io/v1/workspaces/workspace-123/query"
        );
    }

    #[test]
    fn test_base_url_override() {
        let executor = make_executor().with_base_url("http://localhost:9999/");
        assert_eq!(executor.url(), "http://localhost:9999/v1/workspaces/workspace-123/query");
    }

    #[test]
    fn test_parse_query_response() {
        let body = r#"{
            "tables": [{
                "name": "PrimaryResult",
                "columns": [
                    {"name": "TotalMessagesSent", "type": "long"},
                    {"name": "Location", "type": "string"}
                ],
                "rows": [[1250, "westus"]]
            }]
        }"#;
        let parsed: QueryResponse = serde_json::from_str(body).unwrap();
        let table = LogAnalyticsExecutor::table_from_wire(parsed.tables.into_iter().next().unwrap());
        assert_eq!(table.name, "PrimaryResult");
        assert_eq!(table.columns[0].name, "TotalMessagesSent");
        assert_eq!(table.rows[0][0], serde_json::json!(1250));
    }

    #[test]
    fn test_diagnostic_prefers_structured_error() {
        let body = r#"{"error": {"code": "BadArgumentError", "message": "Unknown function: 'summarise'"}}"#;
        let diagnostic = LogAnalyticsExecutor::diagnostic_from_body(
            reqwest::StatusCode::BAD_REQUEST,
            body,
        );
        assert_eq!(diagnostic, "BadArgumentError: Unknown function: 'summarise'");
    }

    #[test]
    fn test_diagnostic_falls_back_to_raw_body() {
        let diagnostic = LogAnalyticsExecutor::diagnostic_from_body(
            reqwest::StatusCode::BAD_GATEWAY,
            "upstream timeout",
        );
        assert!(diagnostic.contains("502"));
        assert!(diagnostic.contains("upstream timeout"));
    }
}
