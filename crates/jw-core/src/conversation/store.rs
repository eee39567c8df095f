use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::UserId;

/// Where a user is in the `/search` dialogue. Idle users have no entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    AwaitingTerm,
    AwaitingLocation { search_term: String },
}

/// Per-user conversation state.
///
/// Entries never expire on their own; a user who walks away mid-dialogue keeps
/// their session until the next `/search`, `/cancel` or completed search.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, user_id: UserId) -> Option<SessionState>;

    async fn set(&self, user_id: UserId, state: SessionState);

    /// Remove the session, returning what was there.
    async fn clear(&self, user_id: UserId) -> Option<SessionState>;
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    inner: Mutex<HashMap<UserId, SessionState>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, user_id: UserId) -> Option<SessionState> {
        self.inner.lock().await.get(&user_id).cloned()
    }

    async fn set(&self, user_id: UserId, state: SessionState) {
        self.inner.lock().await.insert(user_id, state);
    }

    async fn clear(&self, user_id: UserId) -> Option<SessionState> {
        self.inner.lock().await.remove(&user_id)
    }
}
