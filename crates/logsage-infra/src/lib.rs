//! Infrastructure adapters for Logsage.
//!
//! Concrete implementations of the logsage-core ports: the Azure OpenAI
//! completion provider, the Log Analytics query executor (with AAD token
//! caching), and the in-process chat relay. Configuration loading lives
//! here too.

pub mod config;
pub mod llm;
pub mod loganalytics;
pub mod relay;
