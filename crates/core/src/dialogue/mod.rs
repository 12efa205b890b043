//! Confirmation dialogue state
//!
//! Destructive commands are armed here and only executed after an
//! affirmative reply from the same conversation. Pending entries never
//! expire on their own; a process restart drops them, which silently
//! cancels the confirmation.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Transport-level conversation identifier.
pub type ChatId = i64;

/// A destructive action waiting for a yes/no reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    /// Wipe the whole task book.
    DeleteAll,
    /// Delete one bucket, or one task within it.
    DeleteSpecific {
        date: String,
        task_number: Option<usize>,
    },
}

/// How an inbound reply reads while a confirmation is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Affirmative,
    Negative,
    Other,
}

impl Reply {
    pub fn classify(text: &str) -> Self {
        match text.trim().to_lowercase().as_str() {
            "да" | "yes" => Reply::Affirmative,
            "нет" | "no" => Reply::Negative,
            _ => Reply::Other,
        }
    }
}

/// Per-conversation pending-confirmation storage.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, chat: ChatId) -> Option<PendingAction>;
    async fn set(&self, chat: ChatId, pending: PendingAction);
    async fn clear(&self, chat: ChatId) -> Option<PendingAction>;
}

/// In-memory session store, the only implementation the bot ships with.
/// Swappable for a persistent or expiring store through the trait.
#[derive(Default)]
pub struct InMemorySessions {
    entries: RwLock<HashMap<ChatId, PendingAction>>,
}

impl InMemorySessions {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessions {
    async fn get(&self, chat: ChatId) -> Option<PendingAction> {
        self.entries.read().await.get(&chat).cloned()
    }

    async fn set(&self, chat: ChatId, pending: PendingAction) {
        self.entries.write().await.insert(chat, pending);
    }

    async fn clear(&self, chat: ChatId) -> Option<PendingAction> {
        self.entries.write().await.remove(&chat)
    }
}
