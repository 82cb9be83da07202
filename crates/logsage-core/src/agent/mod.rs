//! Tool-call variant of the analyst.
//!
//! Instead of the four-step pipeline, the completion engine is given two
//! tools and drives querying itself: `execute_logs_query` (runs KQL,
//! returns JSON rows) and `get_table_schema` (returns the schema catalog
//! text). The engine replies either with a JSON tool invocation or with a
//! final answer; the loop is bounded by an explicit [`StepBudget`] so the
//! engine can never spin the turn forever.

pub mod budget;

use serde::Deserialize;

use logsage_types::config::OrchestratorTuning;
use logsage_types::error::TurnError;
use logsage_types::llm::{CompletionRequest, Message};

use crate::executor::QueryExecutor;
use crate::llm::provider::CompletionProvider;
use crate::schema::SchemaCatalog;

use budget::{BudgetStatus, StepBudget};

const TOOL_INSTRUCTIONS: &str = r#"You are an assistant answering questions about email metrics stored in Log Analyzer tables.

You have two tools. To call a tool, reply with ONLY a JSON object, no other text:
{"tool": "get_table_schema"}
{"tool": "execute_logs_query", "arguments": {"query": "<KQL>"}}

Rules:
- Always fetch the Log Analyzer schema for grounding before executing a query.
- Consider the limitations and syntax of KQL when writing the query. The logs for different operations are stored in different tables.
- Always limit the query to at most 100 rows.
- execute_logs_query returns JSON containing the results.
- When you have enough data, reply with the final answer as plain text (markdown permitted), not JSON."#;

/// One parsed engine reply: either a tool invocation or a final answer.
#[derive(Debug, Deserialize)]
struct ToolCall {
    tool: String,
    #[serde(default)]
    arguments: ToolArguments,
}

#[derive(Debug, Default, Deserialize)]
struct ToolArguments {
    #[serde(default)]
    query: String,
}

/// Engine-driven analyst over the query toolbox, with a hard step cap.
pub struct ToolLoopAnalyst<P, Q> {
    provider: P,
    executor: Q,
    schema: SchemaCatalog,
    model: String,
    tuning: OrchestratorTuning,
}

impl<P, Q> ToolLoopAnalyst<P, Q>
where
    P: CompletionProvider,
    Q: QueryExecutor,
{
    pub fn new(provider: P, executor: Q, model: impl Into<String>, tuning: OrchestratorTuning) -> Self {
        Self {
            provider,
            executor,
            schema: SchemaCatalog,
            model: model.into(),
            tuning,
        }
    }

    /// Run the engine-driven loop to completion or budget exhaustion.
    ///
    /// Every completion call consumes one step; a non-JSON reply is taken
    /// as the final answer. Exhaustion is a terminal
    /// [`TurnError::StepBudgetExceeded`], never a silent truncation.
    #[tracing::instrument(name = "tool_loop", skip_all)]
    pub async fn run(&self, question: &str) -> Result<String, TurnError> {
        let budget = StepBudget::new(self.tuning.tool_step_budget);
        let mut messages = vec![
            Message::system(TOOL_INSTRUCTIONS),
            Message::user(question),
        ];

        loop {
            if budget.consume() == BudgetStatus::Exhausted {
                return Err(TurnError::StepBudgetExceeded {
                    steps: budget.used(),
                });
            }

            let request = CompletionRequest {
                model: self.model.clone(),
                messages: messages.clone(),
                max_tokens: self.tuning.max_completion_tokens,
                temperature: Some(self.tuning.temperature),
            };
            let response = self.provider.complete(&request).await?;
            let reply = response.content.unwrap_or_default().trim().to_string();

            let Ok(call) = serde_json::from_str::<ToolCall>(&reply) else {
                // Plain text is the final answer.
                return Ok(reply);
            };

            let observation = match call.tool.as_str() {
                "get_table_schema" => {
                    tracing::debug!("tool call: get_table_schema");
                    self.schema.text().to_string()
                }
                "execute_logs_query" => {
                    tracing::debug!(query = %call.arguments.query, "tool call: execute_logs_query");
                    match self.executor.execute(&call.arguments.query).await {
                        Ok(table) => table.to_grounding_json(),
                        // The engine sees the diagnostic and may correct
                        // itself on the next step, within budget.
                        Err(e) => format!("Query failed: {}", e.diagnostic),
                    }
                }
                other => format!("Unknown tool: {other}"),
            };

            messages.push(Message::assistant(reply));
            messages.push(Message::user(format!("Tool result:\n{observation}")));
        }
    }
}
