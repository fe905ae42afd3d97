//! Collaborator traits for Chorus
//!
//! The playback core never talks to a chat platform or a media host
//! directly. It consumes these two seams instead.

use crate::error::Result;
use crate::types::{ChatId, ResolvedAudio, SearchResult, StreamSource, TrackId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Turns a search query or link into playable track metadata
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Search for up to `limit` results
    ///
    /// An empty vector means "no results"; callers never treat it as an error.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>>;

    /// Extract metadata and a playable audio location for a page link
    ///
    /// # Errors
    /// Returns `ChorusError::Resolver` when extraction fails
    async fn resolve_audio(&self, origin_url: &str) -> Result<ResolvedAudio>;
}

/// Voice-call media transport
///
/// Every method may suspend on network I/O. Implementations report failures
/// as `ChorusError::Transport` (or `NoActiveCall` for `join`) and never retry
/// on their own.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Join the chat's voice call
    async fn join(&self, chat_id: ChatId) -> Result<()>;

    /// Leave the chat's voice call
    async fn leave(&self, chat_id: ChatId) -> Result<()>;

    /// Start a stream, replacing the active one if any
    async fn play(&self, chat_id: ChatId, source: &StreamSource) -> Result<()>;

    /// Pause the active stream
    async fn pause(&self, chat_id: ChatId) -> Result<()>;

    /// Resume the paused stream
    async fn resume(&self, chat_id: ChatId) -> Result<()>;

    /// Set call volume (1-200)
    async fn set_volume(&self, chat_id: ChatId, volume: u8) -> Result<()>;
}

/// Lifecycle notifications emitted asynchronously by a transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportEvent {
    /// A stream reached its natural end (not an explicit stop)
    StreamEnded {
        /// Chat the stream belonged to
        chat_id: ChatId,
        /// Track named in the `StreamSource` that was played
        track_id: TrackId,
    },

    /// The voice call itself ended
    CallEnded {
        /// Chat whose call ended
        chat_id: ChatId,
    },
}

impl TransportEvent {
    /// Chat the event refers to
    pub fn chat_id(&self) -> ChatId {
        match self {
            TransportEvent::StreamEnded { chat_id, .. } | TransportEvent::CallEnded { chat_id } => {
                *chat_id
            }
        }
    }
}
