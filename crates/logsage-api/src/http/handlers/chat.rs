//! Chat HTTP handlers.
//!
//! Endpoints:
//! - PUT  /chat                  - Create a new conversation thread
//! - POST /chat                  - Run one turn (answer arrives via the relay)
//! - GET  /chat/{thread_id}      - Poll for messages, optionally after a cursor
//! - POST /chat/completions      - Stateless synchronous variant

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use logsage_core::relay::ChatRelay;
use logsage_types::chat::{ChatMessage, ChatRole, ThreadId};
use logsage_types::error::TurnError;
use logsage_types::llm::Message;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Body for POST /chat.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessMessageRequest {
    pub thread_id: Option<String>,
    pub message: Option<String>,
}

/// Query parameters for GET /chat/{thread_id}.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesQuery {
    pub last_message_id: Option<Uuid>,
}

/// Body for POST /chat/completions.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionsRequest {
    pub last_user_question: Option<String>,
    #[serde(default)]
    pub full_history: Vec<HistoryEntry>,
}

/// One prior exchange in the stateless variant's replayed history.
#[derive(Debug, Deserialize)]
pub struct HistoryEntry {
    pub role: Option<String>,
    pub content: Option<String>,
}

fn parse_thread_id(s: &str) -> Result<ThreadId, AppError> {
    s.parse::<ThreadId>()
        .map_err(|_| AppError::Validation(format!("Invalid thread id: {s}")))
}

/// PUT /chat - Create a conversation thread and return its identifier.
pub async fn start_conversation(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let thread = state.relay.create_thread().await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "threadId": thread.to_string() }),
        request_id,
        elapsed,
    )))
}

/// POST /chat - Run one full turn on a thread.
///
/// Returns 202 with no body; the answer (and any progress messages) is
/// delivered through the relay and picked up by polling. Turns on the same
/// thread are serialized behind a per-thread lock.
pub async fn process_message(
    State(state): State<AppState>,
    Json(request): Json<ProcessMessageRequest>,
) -> Result<StatusCode, AppError> {
    let thread_id = request
        .thread_id
        .as_deref()
        .ok_or(TurnError::MissingInput("threadId"))?;
    let message = match request.message.as_deref() {
        Some(m) if !m.trim().is_empty() => m,
        _ => return Err(TurnError::MissingInput("message").into()),
    };
    let thread = parse_thread_id(thread_id)?;

    let lock = state.turn_lock(thread);
    let _guard = lock.lock().await;

    let report = state.orchestrator.run_turn(thread, message).await?;
    tracing::info!(thread = %thread, outcome = ?report.outcome, "turn completed");

    Ok(StatusCode::ACCEPTED)
}

/// GET /chat/{thread_id} - Fetch messages, optionally after `lastMessageId`.
///
/// Progress markers with empty content are filtered out; only user and
/// assistant messages exist in the relay, so no role filtering is needed
/// beyond the closed enum.
pub async fn get_messages(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<ApiResponse<Vec<ChatMessage>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let thread = parse_thread_id(&thread_id)?;
    let messages: Vec<ChatMessage> = state
        .relay
        .fetch_messages_since(thread, query.last_message_id)
        .await?
        .into_iter()
        .filter(|m| !m.content.is_empty())
        .collect();

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(messages, request_id, elapsed)))
}

/// POST /chat/completions - Stateless synchronous turn.
///
/// The caller supplies the question and the full prior exchange; entries
/// with an unresolvable role or no content are dropped before the history
/// reaches the orchestrator.
pub async fn completions(
    State(state): State<AppState>,
    Json(request): Json<CompletionsRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let question = match request.last_user_question.as_deref() {
        Some(q) if !q.trim().is_empty() => q,
        _ => return Err(TurnError::MissingInput("lastUserQuestion").into()),
    };

    let history: Vec<Message> = request
        .full_history
        .iter()
        .filter_map(|entry| {
            let content = entry.content.as_deref().filter(|c| !c.is_empty())?;
            match ChatRole::from_label(entry.role.as_deref())? {
                ChatRole::User => Some(Message::user(content)),
                ChatRole::Assistant => Some(Message::assistant(content)),
            }
        })
        .collect();

    let answer = state.orchestrator.answer(question, &history).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "role": "assistant", "content": answer }),
        request_id,
        elapsed,
    )))
}
