use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::event::ConversationState;
use crate::types::{ChatId, MessageId, Money, UserId};

/// Transient per-user dialogue state. Lives only as long as the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSession {
    pub chat_id: ChatId,
    pub state: ConversationState,
    /// Amount collected at the first step, held until the months arrive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Money>,
    /// Bot messages sent during this session, for hide-on-exit.
    pub bot_messages: Vec<MessageId>,
    /// User messages received during this session, for hide-on-exit.
    pub user_messages: Vec<MessageId>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationSession {
    pub fn new(chat_id: ChatId) -> Self {
        let now = Utc::now();
        Self {
            chat_id,
            state: ConversationState::AwaitingAmount,
            principal: None,
            bot_messages: Vec::new(),
            user_messages: Vec::new(),
            started_at: now,
            updated_at: now,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Keyed table of sessions, one per user.
///
/// Implementations must serialize mutations of a single key; different keys
/// never observe each other.
pub trait SessionStore: Send + Sync {
    fn get(&self, user_id: UserId) -> Option<ConversationSession>;

    /// Replace any existing session for `user_id` with a fresh one.
    fn start(&self, user_id: UserId, chat_id: ChatId) -> ConversationSession;

    /// Apply `f` to the user's session in place. Returns false if there is none.
    fn update(&self, user_id: UserId, f: &mut dyn FnMut(&mut ConversationSession)) -> bool;

    fn clear(&self, user_id: UserId) -> Option<ConversationSession>;

    /// Drop sessions untouched for longer than `max_idle`; returns how many went.
    fn purge_idle(&self, max_idle: Duration) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory implementation of SessionStore
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<DashMap<UserId, ConversationSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, user_id: UserId) -> Option<ConversationSession> {
        self.sessions.get(&user_id).map(|entry| entry.clone())
    }

    fn start(&self, user_id: UserId, chat_id: ChatId) -> ConversationSession {
        let session = ConversationSession::new(chat_id);
        self.sessions.insert(user_id, session.clone());
        tracing::info!(user_id, chat_id, "session started");
        session
    }

    fn update(&self, user_id: UserId, f: &mut dyn FnMut(&mut ConversationSession)) -> bool {
        match self.sessions.get_mut(&user_id) {
            Some(mut entry) => {
                f(entry.value_mut());
                entry.touch();
                true
            }
            None => false,
        }
    }

    fn clear(&self, user_id: UserId) -> Option<ConversationSession> {
        let removed = self.sessions.remove(&user_id).map(|(_, session)| session);
        if removed.is_some() {
            tracing::info!(user_id, "session cleared");
        }
        removed
    }

    fn purge_idle(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.updated_at >= cutoff);
        let purged = before.saturating_sub(self.sessions.len());
        if purged > 0 {
            tracing::debug!(purged, "purged idle sessions");
        }
        purged
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }
}
