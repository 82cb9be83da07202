//! Shared domain types for Logsage.
//!
//! Pure data shapes used across the workspace: LLM request/response types,
//! chat thread/message types, tabular query results, the turn error
//! taxonomy, and configuration structs. No business logic lives here.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod query;
