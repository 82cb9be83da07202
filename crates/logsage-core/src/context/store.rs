//! Keyed conversation-context store.
//!
//! Holds the single distilled-context string for each active thread. The
//! context is monotonically re-derived each turn: `replace` overwrites, it
//! never appends. An earlier design held one process-wide context string,
//! which corrupts concurrent sessions; this store keys by thread id instead,
//! and callers serialize turns per thread.
//!
//! Context is scoped to one conversation and is not persisted across
//! process restarts.

use dashmap::DashMap;

use logsage_types::chat::ThreadId;

/// Mapping from thread id to that thread's current distilled context.
///
/// Cloning produces a shared view of the same map.
#[derive(Debug, Clone, Default)]
pub struct ContextStore {
    contexts: std::sync::Arc<DashMap<ThreadId, String>>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current context for a thread; empty at session start.
    pub fn get(&self, thread: ThreadId) -> String {
        self.contexts
            .get(&thread)
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    /// Replace (never merge) the context for a thread.
    pub fn replace(&self, thread: ThreadId, context: String) {
        self.contexts.insert(thread, context);
    }

    /// Drop a thread's context (session teardown).
    pub fn remove(&self, thread: ThreadId) {
        self.contexts.remove(&thread);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_thread_yields_empty_context() {
        let store = ContextStore::new();
        assert_eq!(store.get(ThreadId::new()), "");
    }

    #[test]
    fn test_replace_overwrites() {
        let store = ContextStore::new();
        let thread = ThreadId::new();
        store.replace(thread, "User asks how many emails were sent last week.".into());
        store.replace(thread, "User asks how many emails were sent last month.".into());
        assert_eq!(
            store.get(thread),
            "User asks how many emails were sent last month."
        );
    }

    #[test]
    fn test_threads_are_isolated() {
        let store = ContextStore::new();
        let a = ThreadId::new();
        let b = ThreadId::new();
        store.replace(a, "context a".into());
        assert_eq!(store.get(b), "");
        store.remove(a);
        assert_eq!(store.get(a), "");
    }

    #[test]
    fn test_clone_shares_state() {
        let store = ContextStore::new();
        let view = store.clone();
        let thread = ThreadId::new();
        store.replace(thread, "shared".into());
        assert_eq!(view.get(thread), "shared");
    }
}
