//! The query-orchestration state machine.
//!
//! One turn drives: context distillation, query synthesis grounded in the
//! schema catalog, query execution with a single bounded repair attempt,
//! and answer synthesis grounded in the returned data.
//!
//! ```text
//! START -> CONTEXT_UPDATED -> QUERY_SYNTHESIZED
//!       -> {DATA_FETCHED | QUERY_REPAIRED | QUERY_ABANDONED}
//!       -> ANSWER_SYNTHESIZED -> DONE
//! ```
//!
//! The four completion calls in a full turn are strictly sequential; each
//! depends on the previous one's output. Partial progress is never
//! persisted across a fatal failure: the next turn restarts from START.

pub mod prompts;

use chrono::Utc;

use logsage_types::chat::{ChatRole, ThreadId};
use logsage_types::config::OrchestratorTuning;
use logsage_types::error::{GenerationStage, TurnError};
use logsage_types::llm::{CompletionRequest, Message};
use logsage_types::query::QueryTable;

use crate::context::store::ContextStore;
use crate::context::tracker;
use crate::executor::QueryExecutor;
use crate::llm::provider::CompletionProvider;
use crate::relay::ChatRelay;
use crate::schema::SchemaCatalog;

/// Terminal answer when no query could be formulated (empty synthesis or
/// empty repair).
pub const CANNOT_FORMULATE_ANSWER: &str = "I couldn't come up with a query to answer your question. Sorry. Is there anything else I can help you with?";

/// Terminal answer when the repaired query failed as well.
pub const REPAIR_FAILED_ANSWER: &str = "Updated query produces an error as well, sorry. I couldn't come up with a query to answer your question. Is there anything else I can help you with?";

const PROCESSING_NOTICE: &str = "I received reply from the database. Let me process it...";

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// A query (original or repaired) executed and an answer was synthesized.
    Answered { repaired: bool },
    /// No usable query existed (empty synthesis or empty repair).
    Abandoned,
    /// Both the original and the repaired query failed.
    RepairFailed,
}

/// Result of a completed (non-fatal) turn.
#[derive(Debug, Clone)]
pub struct TurnReport {
    /// The re-derived conversation context.
    pub context: String,
    /// The last query attempted, if any was synthesized.
    pub query: Option<String>,
    /// The answer delivered to the user (terminal text on abandonment).
    pub answer: String,
    pub outcome: TurnOutcome,
}

/// Drives the turn state machine over the three ports.
///
/// Generic over provider, executor, and relay so the core never depends on
/// infrastructure types. Conversation context lives in the keyed
/// [`ContextStore`]; callers serialize turns per thread.
pub struct TurnOrchestrator<P, Q, R> {
    provider: P,
    executor: Q,
    relay: R,
    contexts: ContextStore,
    schema: SchemaCatalog,
    model: String,
    resource_id: String,
    tuning: OrchestratorTuning,
}

impl<P, Q, R> TurnOrchestrator<P, Q, R>
where
    P: CompletionProvider,
    Q: QueryExecutor,
    R: ChatRelay,
{
    /// Create an orchestrator. The resource id is lower-cased once here;
    /// every generated query pins to the lower-cased literal.
    pub fn new(
        provider: P,
        executor: Q,
        relay: R,
        contexts: ContextStore,
        model: impl Into<String>,
        resource_id: &str,
        tuning: OrchestratorTuning,
    ) -> Self {
        Self {
            provider,
            executor,
            relay,
            contexts,
            schema: SchemaCatalog,
            model: model.into(),
            resource_id: resource_id.to_lowercase(),
            tuning,
        }
    }

    /// The keyed context store (shared view).
    pub fn contexts(&self) -> &ContextStore {
        &self.contexts
    }

    /// Run one full relayed turn: append the user message, drive the state
    /// machine, and append progress and outcome messages along the way.
    ///
    /// Errors returned here are fatal for the turn; the transport layer
    /// surfaces a generic failure and nothing of the turn is kept except
    /// messages already relayed.
    #[tracing::instrument(name = "run_turn", skip(self, question), fields(thread = %thread))]
    pub async fn run_turn(
        &self,
        thread: ThreadId,
        question: &str,
    ) -> Result<TurnReport, TurnError> {
        self.relay
            .append_message(thread, ChatRole::User, question)
            .await?;

        // Step 1: re-derive the conversation context.
        let previous = self.contexts.get(thread);
        let context = tracker::update(
            &self.provider,
            &self.model,
            &self.tuning,
            &previous,
            question,
        )
        .await?;
        self.contexts.replace(thread, context.clone());
        tracing::debug!(phase = "CONTEXT_UPDATED");

        // Step 2: synthesize the query.
        let query = self.synthesize_query(&context).await?;
        if query.is_empty() {
            tracing::debug!(phase = "QUERY_ABANDONED");
            self.relay
                .append_message(thread, ChatRole::Assistant, CANNOT_FORMULATE_ANSWER)
                .await?;
            return Ok(TurnReport {
                context,
                query: None,
                answer: CANNOT_FORMULATE_ANSWER.to_string(),
                outcome: TurnOutcome::Abandoned,
            });
        }
        tracing::debug!(phase = "QUERY_SYNTHESIZED");
        self.relay
            .append_message(
                thread,
                ChatRole::Assistant,
                &format!(
                    "I will try to respond to your question by executing this query first:\n```kql\n{query}\n```"
                ),
            )
            .await?;

        // Step 3: execute, with at most one repair attempt.
        let (data, query, repaired) = match self.executor.execute(&query).await {
            Ok(table) => (table.to_grounding_json(), query, false),
            Err(first_failure) => {
                tracing::warn!(diagnostic = %first_failure.diagnostic, "query execution failed, attempting repair");
                let repair = self.repair_query(&query, &first_failure.diagnostic).await?;
                if repair.is_empty() {
                    tracing::debug!(phase = "QUERY_ABANDONED");
                    self.relay
                        .append_message(thread, ChatRole::Assistant, CANNOT_FORMULATE_ANSWER)
                        .await?;
                    return Ok(TurnReport {
                        context,
                        query: Some(query),
                        answer: CANNOT_FORMULATE_ANSWER.to_string(),
                        outcome: TurnOutcome::Abandoned,
                    });
                }
                tracing::debug!(phase = "QUERY_REPAIRED");
                self.relay
                    .append_message(
                        thread,
                        ChatRole::Assistant,
                        &format!(
                            "It seems like previous query produces an error. Let me try this new query:\n```kql\n{repair}\n```"
                        ),
                    )
                    .await?;
                match self.executor.execute(&repair).await {
                    Ok(table) => (table.to_grounding_json(), repair, true),
                    Err(second_failure) => {
                        // Bounded retry: exactly one. Terminal for the turn.
                        tracing::warn!(diagnostic = %second_failure.diagnostic, "repaired query failed, abandoning turn");
                        self.relay
                            .append_message(thread, ChatRole::Assistant, REPAIR_FAILED_ANSWER)
                            .await?;
                        return Ok(TurnReport {
                            context,
                            query: Some(repair),
                            answer: REPAIR_FAILED_ANSWER.to_string(),
                            outcome: TurnOutcome::RepairFailed,
                        });
                    }
                }
            }
        };
        tracing::debug!(phase = "DATA_FETCHED");
        self.relay
            .append_message(thread, ChatRole::Assistant, PROCESSING_NOTICE)
            .await?;

        // Step 4: synthesize the grounded answer.
        let answer = self
            .synthesize_answer(question, &[], &context, &data)
            .await?;
        tracing::debug!(phase = "ANSWER_SYNTHESIZED");
        self.relay
            .append_message(thread, ChatRole::Assistant, &answer)
            .await?;

        Ok(TurnReport {
            context,
            query: Some(query),
            answer,
            outcome: TurnOutcome::Answered { repaired },
        })
    }

    /// Stateless synchronous variant: no relay side effects; the visible
    /// history comes from the caller and the context lives in the reserved
    /// stateless slot of the keyed store.
    #[tracing::instrument(name = "answer", skip_all)]
    pub async fn answer(
        &self,
        question: &str,
        history: &[Message],
    ) -> Result<String, TurnError> {
        let slot = ThreadId::stateless();
        let previous = self.contexts.get(slot);
        let context = tracker::update(
            &self.provider,
            &self.model,
            &self.tuning,
            &previous,
            question,
        )
        .await?;
        self.contexts.replace(slot, context.clone());

        let query = self.synthesize_query(&context).await?;
        if query.is_empty() {
            return Ok(CANNOT_FORMULATE_ANSWER.to_string());
        }

        let data = match self.executor.execute(&query).await {
            Ok(table) => table.to_grounding_json(),
            Err(first_failure) => {
                let repair = self.repair_query(&query, &first_failure.diagnostic).await?;
                if repair.is_empty() {
                    return Ok(CANNOT_FORMULATE_ANSWER.to_string());
                }
                match self.executor.execute(&repair).await {
                    Ok(table) => table.to_grounding_json(),
                    Err(_) => return Ok(REPAIR_FAILED_ANSWER.to_string()),
                }
            }
        };

        self.synthesize_answer(question, history, &context, &data)
            .await
    }

    async fn synthesize_query(&self, context: &str) -> Result<String, TurnError> {
        let instructions = prompts::build_query_prompt(
            self.schema.text(),
            &self.resource_id,
            Utc::now(),
            context,
        );
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![Message::system(instructions), Message::system(context)],
            max_tokens: self.tuning.max_completion_tokens,
            temperature: Some(self.tuning.temperature),
        };
        let response = self.provider.complete(&request).await?;
        let query = response
            .content
            .ok_or(TurnError::EmptyCompletion(GenerationStage::QuerySynthesis))?
            .trim()
            .to_string();
        tracing::info!(query = %query, "query synthesized");
        Ok(query)
    }

    async fn repair_query(&self, query: &str, diagnostic: &str) -> Result<String, TurnError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![Message::system(prompts::build_repair_prompt(
                query, diagnostic,
            ))],
            max_tokens: self.tuning.max_completion_tokens,
            temperature: Some(self.tuning.temperature),
        };
        let response = self.provider.complete(&request).await?;
        let repair = response
            .content
            .ok_or(TurnError::EmptyCompletion(GenerationStage::QueryRepair))?
            .trim()
            .to_string();
        tracing::info!(repair = %repair, "repair synthesized");
        Ok(repair)
    }

    async fn synthesize_answer(
        &self,
        question: &str,
        history: &[Message],
        context: &str,
        data: &str,
    ) -> Result<String, TurnError> {
        let mut messages =
            vec![Message::system(prompts::build_answer_prompt(data, context))];
        messages.extend_from_slice(history);
        messages.push(Message::user(question));

        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.tuning.max_completion_tokens,
            temperature: Some(self.tuning.temperature),
        };
        let response = self.provider.complete(&request).await?;
        response
            .content
            .filter(|c| !c.trim().is_empty())
            .map(|c| c.trim().to_string())
            .ok_or(TurnError::EmptyCompletion(GenerationStage::AnswerSynthesis))
    }
}
