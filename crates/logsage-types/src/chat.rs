//! Chat thread and message types for Logsage.
//!
//! A thread is a durable identifier owning an ordered, append-only sequence
//! of messages. The sender role is a closed enumeration resolved exactly once
//! at the relay boundary; free-text sender labels never travel further into
//! the system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Unique identifier of a chat thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(pub Uuid);

impl ThreadId {
    /// Mint a new time-sortable thread id.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// The reserved slot used by the stateless completion entry point,
    /// which has no caller-provided thread.
    pub fn stateless() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for ThreadId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ThreadId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Sender of a chat message: the human or the assistant.
///
/// Relay transports may carry additional technical senders (system events,
/// participant changes); those have no `ChatRole` and are dropped before
/// messages reach the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Resolve a transport-level sender label into a role.
    ///
    /// Returns `None` for missing or unrecognized labels so the relay
    /// boundary can filter technical messages instead of erroring.
    pub fn from_label(label: Option<&str>) -> Option<Self> {
        match label?.to_ascii_lowercase().as_str() {
            "user" => Some(ChatRole::User),
            "assistant" => Some(ChatRole::Assistant),
            _ => None,
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatRole::User => write!(f, "USER"),
            ChatRole::Assistant => write!(f, "ASSISTANT"),
        }
    }
}

/// A single message within a chat thread.
///
/// Wire names match the conversation API contract (`createdOn` etc.).
/// Ordering within a thread is by `created_on`; `id` is unique within the
/// thread and doubles as the resumption cursor for incremental fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub created_on: DateTime<Utc>,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_id_roundtrip() {
        let id = ThreadId::new();
        let parsed: ThreadId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_stateless_thread_id_is_nil() {
        assert_eq!(ThreadId::stateless().0, Uuid::nil());
    }

    #[test]
    fn test_chat_role_from_label() {
        assert_eq!(ChatRole::from_label(Some("user")), Some(ChatRole::User));
        assert_eq!(ChatRole::from_label(Some("ASSISTANT")), Some(ChatRole::Assistant));
        assert_eq!(ChatRole::from_label(Some("system-event")), None);
        assert_eq!(ChatRole::from_label(None), None);
    }

    #[test]
    fn test_chat_role_serde_uppercase() {
        let json = serde_json::to_string(&ChatRole::User).unwrap();
        assert_eq!(json, "\"USER\"");
    }

    #[test]
    fn test_chat_message_wire_names() {
        let msg = ChatMessage {
            id: Uuid::now_v7(),
            role: ChatRole::Assistant,
            created_on: Utc::now(),
            content: "hello".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"createdOn\""));
        assert!(json.contains("\"role\":\"ASSISTANT\""));
    }
}
