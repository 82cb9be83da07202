//! Observability setup for Logsage.

pub mod tracing_setup;
