//! In-memory [`ChatRelay`].
//!
//! Threads are append-only vectors keyed by [`ThreadId`] in a `DashMap`.
//! Message order is append order, which is also creation order since each
//! append stamps `Utc::now()` under the shard lock.

use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use logsage_core::relay::ChatRelay;
use logsage_types::chat::{ChatMessage, ChatRole, ThreadId};
use logsage_types::error::RelayError;

/// Process-local chat relay. Cheap to clone via `Arc` at the call sites;
/// the map itself is shared through `&self`.
#[derive(Default)]
pub struct InMemoryChatRelay {
    threads: DashMap<ThreadId, Vec<ChatMessage>>,
}

impl InMemoryChatRelay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChatRelay for InMemoryChatRelay {
    async fn create_thread(&self) -> Result<ThreadId, RelayError> {
        let thread = ThreadId::new();
        self.threads.insert(thread, Vec::new());
        tracing::debug!(thread = %thread, "created thread");
        Ok(thread)
    }

    async fn append_message(
        &self,
        thread: ThreadId,
        role: ChatRole,
        content: &str,
    ) -> Result<Uuid, RelayError> {
        let mut entry = self
            .threads
            .get_mut(&thread)
            .ok_or(RelayError::ThreadNotFound)?;
        let message = ChatMessage {
            id: Uuid::now_v7(),
            role,
            created_on: Utc::now(),
            content: content.to_string(),
        };
        let id = message.id;
        entry.push(message);
        Ok(id)
    }

    async fn fetch_messages_since(
        &self,
        thread: ThreadId,
        cursor: Option<Uuid>,
    ) -> Result<Vec<ChatMessage>, RelayError> {
        let entry = self
            .threads
            .get(&thread)
            .ok_or(RelayError::ThreadNotFound)?;
        match cursor {
            None => Ok(entry.clone()),
            Some(id) => {
                let position = entry
                    .iter()
                    .position(|m| m.id == id)
                    .ok_or(RelayError::MessageNotFound)?;
                Ok(entry[position + 1..].to_vec())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_and_fetch_in_order() {
        let relay = InMemoryChatRelay::new();
        let thread = relay.create_thread().await.unwrap();
        relay.append_message(thread, ChatRole::User, "first").await.unwrap();
        relay
            .append_message(thread, ChatRole::Assistant, "second")
            .await
            .unwrap();

        let messages = relay.fetch_messages_since(thread, None).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "first");
        assert_eq!(messages[1].content, "second");
        assert!(messages[0].created_on <= messages[1].created_on);
    }

    #[tokio::test]
    async fn test_cursor_returns_strict_suffix() {
        let relay = InMemoryChatRelay::new();
        let thread = relay.create_thread().await.unwrap();
        let first = relay.append_message(thread, ChatRole::User, "a").await.unwrap();
        relay.append_message(thread, ChatRole::Assistant, "b").await.unwrap();
        relay.append_message(thread, ChatRole::Assistant, "c").await.unwrap();

        let tail = relay.fetch_messages_since(thread, Some(first)).await.unwrap();
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].content, "b");
        assert_eq!(tail[1].content, "c");
    }

    #[tokio::test]
    async fn test_cursor_at_last_message_is_empty() {
        let relay = InMemoryChatRelay::new();
        let thread = relay.create_thread().await.unwrap();
        relay.append_message(thread, ChatRole::User, "a").await.unwrap();
        let last = relay.append_message(thread, ChatRole::Assistant, "b").await.unwrap();

        let tail = relay.fetch_messages_since(thread, Some(last)).await.unwrap();
        assert!(tail.is_empty());
    }

    #[tokio::test]
    async fn test_empty_thread_yields_empty_vec() {
        let relay = InMemoryChatRelay::new();
        let thread = relay.create_thread().await.unwrap();
        let messages = relay.fetch_messages_since(thread, None).await.unwrap();
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_thread_is_an_error() {
        let relay = InMemoryChatRelay::new();
        let result = relay.fetch_messages_since(ThreadId::new(), None).await;
        assert!(matches!(result, Err(RelayError::ThreadNotFound)));
    }

    #[tokio::test]
    async fn test_unknown_cursor_is_an_error() {
        let relay = InMemoryChatRelay::new();
        let thread = relay.create_thread().await.unwrap();
        relay.append_message(thread, ChatRole::User, "a").await.unwrap();
        let result = relay
            .fetch_messages_since(thread, Some(Uuid::now_v7()))
            .await;
        assert!(matches!(result, Err(RelayError::MessageNotFound)));
    }
}
