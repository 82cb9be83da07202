//! ChatRelay trait definition.
//!
//! The relay is a durable append-only message log per conversation thread.
//! The orchestrator treats it as an at-least-once message sink, never as a
//! source of orchestration state: conversation context lives in the
//! [`ContextStore`](crate::context::store::ContextStore), not in relay
//! metadata.

use std::sync::Arc;

use uuid::Uuid;

use logsage_types::chat::{ChatMessage, ChatRole, ThreadId};
use logsage_types::error::RelayError;

/// Repository-style trait for chat thread and message transport.
///
/// Contract:
/// - `fetch_messages_since` returns messages strictly after the cursor's
///   creation position, in creation order, and tolerates being called on a
///   thread with no messages yet (empty vec, not an error).
/// - Messages with no resolvable role are filtered out by the
///   implementation before they reach callers.
pub trait ChatRelay: Send + Sync {
    /// Create a new thread and return its identifier.
    fn create_thread(
        &self,
    ) -> impl std::future::Future<Output = Result<ThreadId, RelayError>> + Send;

    /// Append a message to a thread and return the new message id.
    fn append_message(
        &self,
        thread: ThreadId,
        role: ChatRole,
        content: &str,
    ) -> impl std::future::Future<Output = Result<Uuid, RelayError>> + Send;

    /// Fetch messages created after `cursor`, or all messages when `cursor`
    /// is `None`. Ordering is by creation time, oldest first.
    fn fetch_messages_since(
        &self,
        thread: ThreadId,
        cursor: Option<Uuid>,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RelayError>> + Send;
}

impl<R: ChatRelay> ChatRelay for Arc<R> {
    async fn create_thread(&self) -> Result<ThreadId, RelayError> {
        (**self).create_thread().await
    }

    async fn append_message(
        &self,
        thread: ThreadId,
        role: ChatRole,
        content: &str,
    ) -> Result<Uuid, RelayError> {
        (**self).append_message(thread, role, content).await
    }

    async fn fetch_messages_since(
        &self,
        thread: ThreadId,
        cursor: Option<Uuid>,
    ) -> Result<Vec<ChatMessage>, RelayError> {
        (**self).fetch_messages_since(thread, cursor).await
    }
}
