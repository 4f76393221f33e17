use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::types::ConversationSession;

pub type SharedSession = Arc<Mutex<ConversationSession>>;

/// Thread-safe registry of conversation sessions keyed by user id.
///
/// The map only hands out `Arc` handles; the shard guard is dropped before
/// the caller awaits the per-session mutex.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, SharedSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        info!("Initializing session store with DashMap");
        Self::default()
    }

    pub fn get_or_create(&self, user_id: &str) -> SharedSession {
        if let Some(existing) = self.sessions.get(user_id) {
            return Arc::clone(existing.value());
        }

        let entry = self.sessions.entry(user_id.to_string()).or_insert_with(|| {
            let session = ConversationSession::new(user_id);
            debug!("Created session {} for user {}", session.session_id, user_id);
            Arc::new(Mutex::new(session))
        });
        Arc::clone(entry.value())
    }

    pub fn get(&self, user_id: &str) -> Option<SharedSession> {
        self.sessions.get(user_id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
