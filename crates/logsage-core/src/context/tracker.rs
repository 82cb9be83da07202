//! Conversation context distillation.
//!
//! One completion call per turn re-derives the context string from the
//! previous context and the latest user message. The instruction template
//! teaches the engine to extract the metric the user wants, to carry the
//! last-stated time range forward when the user does not restate one, and
//! to leave the context unchanged when the message adds nothing.

use logsage_types::config::OrchestratorTuning;
use logsage_types::error::{GenerationStage, TurnError};
use logsage_types::llm::{CompletionRequest, Message};

use crate::llm::provider::CompletionProvider;

/// Instruction template for the context-update completion call.
///
/// `{current}` is substituted with the previous context string.
const CONTEXT_INSTRUCTIONS: &str = r#"You are an assistant tasked with analyzing the conversation context and accurately updating it based on the user's queries. Follow the detailed instructions below to accurately update the conversation context.

## Instructions ##
The user is querying metrics data. Identify the specific data points the user is requesting regarding the metrics and add these to the conversation context.
Update the conversation with the new requests user has.
If the user asks about a different time range, update the conversation context with the new time range.
If the user does not specify a new time range, retain the last time range specified in current conversation context.
Ensure time ranges mentioned by the user are accurately updated and retained in the conversation context.

If the user doesn't ask additional questions, ensure the updated conversation context remains the same as the current conversation context.

You should reply only with the content of updated conversation context.
## End of Instructions ##

## Current conversation context ##
{current}
## End of current conversation context ##

## Examples ##

Current conversation context is empty
User message: How many emails were sent last week?
Your response: User asks how many emails were sent last week.

Current conversation context: User asks how many emails were sent last week.
User message: How many emails were not delivered?
Your response: User asks how many emails were not delivered last week.

Current conversation context: User asks how many emails were not delivered last week.
User message: And what about last month?
Your response: User asks how many emails were not delivered last month.

## End of examples ##"#;

/// Build the instruction text for a context update.
pub fn build_context_prompt(previous_context: &str) -> String {
    CONTEXT_INSTRUCTIONS.replace("{current}", previous_context)
}

/// Re-derive the conversation context from `(previous_context, user_message)`.
///
/// Returns the engine's raw text output as the new context. A missing
/// completion is fatal for the turn; there is no silent default.
#[tracing::instrument(name = "update_context", skip_all, fields(previous_len = previous_context.len()))]
pub async fn update<P: CompletionProvider>(
    provider: &P,
    model: &str,
    tuning: &OrchestratorTuning,
    previous_context: &str,
    user_message: &str,
) -> Result<String, TurnError> {
    let request = CompletionRequest {
        model: model.to_string(),
        messages: vec![
            Message::system(build_context_prompt(previous_context)),
            Message::user(user_message),
        ],
        max_tokens: tuning.max_completion_tokens,
        temperature: Some(tuning.temperature),
    };

    let response = provider.complete(&request).await?;
    let updated = response
        .content
        .ok_or(TurnError::EmptyCompletion(GenerationStage::ContextUpdate))?
        .trim()
        .to_string();

    tracing::info!(context = %updated, "conversation context updated");
    Ok(updated)
}
