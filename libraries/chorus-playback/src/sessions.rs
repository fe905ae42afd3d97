//! Chat id → session mapping
//!
//! Locking a chat's session is how the orchestrator enters that chat's
//! exclusive section. `tokio::sync::Mutex` is fair, so operations and events
//! for one chat run in the order they reached the lock.

use std::collections::HashMap;
use std::sync::Arc;

use chorus_core::{ChatId, Transport};
use tokio::sync::{Mutex, RwLock};

use crate::session::PlaybackSession;
use crate::types::PlaybackConfig;

/// Owns exactly one `PlaybackSession` per chat
pub struct SessionRegistry {
    transport: Arc<dyn Transport>,
    config: PlaybackConfig,
    sessions: RwLock<HashMap<ChatId, Arc<Mutex<PlaybackSession>>>>,
}

impl SessionRegistry {
    /// Create an empty registry; sessions will drive `transport`
    pub fn new(transport: Arc<dyn Transport>, config: PlaybackConfig) -> Self {
        Self {
            transport,
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Session for `chat_id`, created idle on first reference
    ///
    /// Insert-if-absent under the write lock guarantees a single session per
    /// chat even when two first references race.
    pub async fn get_or_create(&self, chat_id: ChatId) -> Arc<Mutex<PlaybackSession>> {
        if let Some(session) = self.sessions.read().await.get(&chat_id) {
            return Arc::clone(session);
        }

        let mut sessions = self.sessions.write().await;
        Arc::clone(sessions.entry(chat_id).or_insert_with(|| {
            Arc::new(Mutex::new(PlaybackSession::new(
                chat_id,
                Arc::clone(&self.transport),
                &self.config,
            )))
        }))
    }

    /// Session for `chat_id` if it was ever referenced
    pub async fn get(&self, chat_id: ChatId) -> Option<Arc<Mutex<PlaybackSession>>> {
        self.sessions.read().await.get(&chat_id).cloned()
    }

    /// Every chat that has a session entry, in id order
    pub async fn chat_ids(&self) -> Vec<ChatId> {
        let mut ids: Vec<ChatId> = self.sessions.read().await.keys().copied().collect();
        ids.sort();
        ids
    }
}
