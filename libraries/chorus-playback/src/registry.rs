//! Chat id → queue mapping

use std::collections::HashMap;
use std::sync::Arc;

use chorus_core::ChatId;
use tokio::sync::{Mutex, RwLock};

use crate::queue::ChatQueue;

/// Owns one `ChatQueue` per chat, created on first access
///
/// The map lock is held only to look up or insert an entry. Reading or
/// mutating a queue happens through the per-chat `Mutex`, which the
/// orchestrator only locks while it already holds that chat's session.
#[derive(Debug)]
pub struct QueueRegistry {
    capacity: usize,
    queues: RwLock<HashMap<ChatId, Arc<Mutex<ChatQueue>>>>,
}

impl QueueRegistry {
    /// Create an empty registry whose queues hold `capacity` tracks
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            queues: RwLock::new(HashMap::new()),
        }
    }

    /// Queue for `chat_id`, created empty if this is the first reference
    pub async fn get_or_create(&self, chat_id: ChatId) -> Arc<Mutex<ChatQueue>> {
        if let Some(queue) = self.queues.read().await.get(&chat_id) {
            return Arc::clone(queue);
        }

        let mut queues = self.queues.write().await;
        Arc::clone(
            queues
                .entry(chat_id)
                .or_insert_with(|| Arc::new(Mutex::new(ChatQueue::new(self.capacity)))),
        )
    }

    /// Queue for `chat_id` if it was ever referenced
    pub async fn get(&self, chat_id: ChatId) -> Option<Arc<Mutex<ChatQueue>>> {
        self.queues.read().await.get(&chat_id).cloned()
    }

    /// Number of chats with a queue entry
    pub async fn len(&self) -> usize {
        self.queues.read().await.len()
    }

    /// Whether no chat has been referenced yet
    pub async fn is_empty(&self) -> bool {
        self.queues.read().await.is_empty()
    }

    /// Capacity given to new queues
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_core::{Track, UserId};
    use std::time::Duration;

    fn track(title: &str) -> Track {
        Track::new(
            title,
            Duration::from_secs(60),
            "https://cdn.example.com/a.m4a",
            "https://video.example.com/a",
            UserId::new(1),
        )
    }

    #[tokio::test]
    async fn creates_lazily_with_configured_capacity() {
        let registry = QueueRegistry::new(3);
        assert!(registry.is_empty().await);
        assert!(registry.get(ChatId::new(1)).await.is_none());

        let queue = registry.get_or_create(ChatId::new(1)).await;
        assert_eq!(queue.lock().await.capacity(), 3);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn same_chat_shares_one_queue() {
        let registry = QueueRegistry::new(10);
        let first = registry.get_or_create(ChatId::new(7)).await;
        first.lock().await.enqueue(track("a")).unwrap();

        let second = registry.get_or_create(ChatId::new(7)).await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn chats_are_independent() {
        let registry = QueueRegistry::new(10);
        registry
            .get_or_create(ChatId::new(1))
            .await
            .lock()
            .await
            .enqueue(track("a"))
            .unwrap();

        let other = registry.get_or_create(ChatId::new(2)).await;
        assert!(other.lock().await.is_empty());
        assert_eq!(registry.len().await, 2);
    }
}
