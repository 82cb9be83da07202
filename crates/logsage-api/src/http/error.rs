//! Application error type mapping to HTTP status codes and envelope format.
//!
//! Internal diagnostics (provider failures, query engine errors) never leak
//! into response bodies; clients get a stable code and a generic message,
//! the detail goes to the trace log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use logsage_types::error::{RelayError, TurnError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// A failed turn.
    Turn(TurnError),
    /// A relay operation outside a turn (thread lookup, message fetch).
    Relay(RelayError),
    /// Malformed request input.
    Validation(String),
}

impl From<TurnError> for AppError {
    fn from(e: TurnError) -> Self {
        AppError::Turn(e)
    }
}

impl From<RelayError> for AppError {
    fn from(e: RelayError) -> Self {
        AppError::Relay(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Turn(TurnError::MissingInput(field)) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format!("Missing required field: {field}"),
            ),
            AppError::Turn(TurnError::Relay(relay)) | AppError::Relay(relay) => match relay {
                RelayError::ThreadNotFound => (
                    StatusCode::NOT_FOUND,
                    "THREAD_NOT_FOUND",
                    "Chat thread not found".to_string(),
                ),
                RelayError::MessageNotFound => (
                    StatusCode::NOT_FOUND,
                    "CURSOR_NOT_FOUND",
                    "Cursor message not found in thread".to_string(),
                ),
                RelayError::Transport(_) => {
                    tracing::error!(error = %relay, "relay transport failure");
                    internal()
                }
            },
            AppError::Turn(e) => {
                tracing::error!(error = %e, "turn failed");
                internal()
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
        };

        let body = json!({
            "data": null,
            "meta": {
                "request_id": "",
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "response_time_ms": 0
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "The request could not be processed".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use logsage_types::error::GenerationStage;
    use logsage_types::llm::LlmError;

    #[test]
    fn test_missing_input_is_bad_request() {
        let response = AppError::Turn(TurnError::MissingInput("message")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unknown_thread_is_not_found() {
        let response = AppError::Relay(RelayError::ThreadNotFound).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_fatal_turn_errors_are_opaque_500s() {
        for err in [
            TurnError::EmptyCompletion(GenerationStage::AnswerSynthesis),
            TurnError::Llm(LlmError::RateLimited),
        ] {
            let response = AppError::Turn(err).into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
