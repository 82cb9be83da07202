//! CompletionProvider trait definition.
//!
//! The completion engine is a pure text-in/text-out collaborator: an ordered
//! list of role-tagged messages in, one generated response out, stateless
//! per call. Implementations live in logsage-infra.

use std::sync::Arc;

use logsage_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for completion-engine backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). The
/// orchestrator only ever issues sequential, non-streaming calls.
pub trait CompletionProvider: Send + Sync {
    /// Human-readable provider name (e.g., "azure-openai").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}

impl<P: CompletionProvider> CompletionProvider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        (**self).complete(request).await
    }
}
