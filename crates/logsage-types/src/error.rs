//! Error taxonomy for the turn pipeline.
//!
//! Only the first `QueryExecutionError` of a turn is recovered (one repair
//! attempt); every other error propagates unmodified to the transport
//! boundary, which surfaces a generic failure rather than raw diagnostics.

use thiserror::Error;

use crate::llm::LlmError;

/// The generation step at which a completion was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    ContextUpdate,
    QuerySynthesis,
    QueryRepair,
    AnswerSynthesis,
}

impl std::fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationStage::ContextUpdate => write!(f, "context update"),
            GenerationStage::QuerySynthesis => write!(f, "query synthesis"),
            GenerationStage::QueryRepair => write!(f, "query repair"),
            GenerationStage::AnswerSynthesis => write!(f, "answer synthesis"),
        }
    }
}

/// The query executor rejected or failed a query.
///
/// `diagnostic` carries the backend's human-readable error text verbatim;
/// the repair prompt depends on it.
#[derive(Debug, Clone, Error)]
#[error("query execution failed: {diagnostic}")]
pub struct QueryExecutionError {
    pub diagnostic: String,
}

impl QueryExecutionError {
    pub fn new(diagnostic: impl Into<String>) -> Self {
        Self {
            diagnostic: diagnostic.into(),
        }
    }
}

/// Errors from chat relay operations.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("chat thread not found")]
    ThreadNotFound,

    #[error("cursor message not found in thread")]
    MessageNotFound,

    #[error("relay transport error: {0}")]
    Transport(String),
}

/// Fatal errors for a single orchestrated turn.
///
/// None of these are retried automatically; the turn aborts, partial
/// progress is discarded, and the next turn restarts the state machine.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("missing required input: {0}")]
    MissingInput(&'static str),

    #[error("completion engine returned no content during {0}")]
    EmptyCompletion(GenerationStage),

    #[error("step budget exceeded after {steps} steps")]
    StepBudgetExceeded { steps: u32 },

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Relay(#[from] RelayError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_completion_display_names_stage() {
        let err = TurnError::EmptyCompletion(GenerationStage::QueryRepair);
        assert!(err.to_string().contains("query repair"));
    }

    #[test]
    fn test_query_execution_error_carries_diagnostic() {
        let err = QueryExecutionError::new("Syntax error: unexpected token '|'");
        assert!(err.to_string().contains("unexpected token"));
    }

    #[test]
    fn test_relay_error_converts_into_turn_error() {
        let err: TurnError = RelayError::ThreadNotFound.into();
        assert!(matches!(err, TurnError::Relay(RelayError::ThreadNotFound)));
    }

    #[test]
    fn test_step_budget_display() {
        let err = TurnError::StepBudgetExceeded { steps: 8 };
        assert_eq!(err.to_string(), "step budget exceeded after 8 steps");
    }
}
