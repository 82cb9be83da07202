//! Turn orchestration and port definitions for Logsage.
//!
//! This crate defines the "ports" (completion provider, query executor,
//! chat relay) that the infrastructure layer implements, plus the query
//! orchestration state machine that drives a user turn from question to
//! grounded answer. It depends only on `logsage-types` -- never on
//! `logsage-infra` or any HTTP/IO crate.

pub mod agent;
pub mod context;
pub mod executor;
pub mod llm;
pub mod orchestrator;
pub mod relay;
pub mod schema;
