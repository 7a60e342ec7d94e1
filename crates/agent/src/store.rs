use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use veranda_core::errors::ApplicationError;
use veranda_core::session::ConversationState;

/// Session persistence seam. Implementations must be safe to call from
/// concurrent turns; the orchestrator serializes turns per session but
/// different sessions load and save in parallel.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, session_id: &str) -> Result<Option<ConversationState>, ApplicationError>;
    async fn save(&self, state: ConversationState) -> Result<(), ApplicationError>;
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, ConversationState>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: &str) -> Result<Option<ConversationState>, ApplicationError> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn save(&self, state: ConversationState) -> Result<(), ApplicationError> {
        self.sessions.write().await.insert(state.session_id.clone(), state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{InMemorySessionStore, SessionStore};
    use veranda_core::session::ConversationState;

    #[tokio::test]
    async fn round_trips_session_state() {
        let store = InMemorySessionStore::new();
        assert!(store.load("s-1").await.expect("load").is_none());

        let state = ConversationState::new("s-1", "returning");
        store.save(state.clone()).await.expect("save");

        let loaded = store.load("s-1").await.expect("load").expect("present");
        assert_eq!(loaded.session_id, "s-1");
        assert_eq!(loaded.loyalty_status, "returning");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn save_overwrites_previous_snapshot() {
        let store = InMemorySessionStore::new();
        let mut state = ConversationState::new("s-1", "none");
        store.save(state.clone()).await.expect("save");

        state.complaint_count = 2;
        store.save(state).await.expect("save");

        let loaded = store.load("s-1").await.expect("load").expect("present");
        assert_eq!(loaded.complaint_count, 2);
    }
}
