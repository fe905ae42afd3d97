//! Playback Events
//!
//! Notifications published by the orchestrator so the command layer can
//! post messages for changes it did not initiate, chiefly automatic
//! advances after a stream ends. Events are emitted at:
//! - Session start, track change, pause/resume, stop
//! - Queue length changes
//! - Volume changes
//! - Failures during event-driven advances

use chorus_core::{ChatId, Track, TrackId};
use serde::{Deserialize, Serialize};

use crate::types::StopReason;

/// Events emitted by the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// A session joined the call and started its first track
    TrackStarted {
        /// Chat the session belongs to
        chat_id: ChatId,
        /// Track now streaming
        track: Track,
    },

    /// The stream moved on to the next queued track
    ///
    /// Emitted for both user skips and natural stream ends.
    TrackChanged {
        /// Chat the session belongs to
        chat_id: ChatId,
        /// ID of the track that was current before
        previous_track_id: Option<TrackId>,
        /// Track now streaming
        track: Track,
    },

    /// Playback paused
    Paused {
        /// Chat the session belongs to
        chat_id: ChatId,
    },

    /// Playback resumed
    Resumed {
        /// Chat the session belongs to
        chat_id: ChatId,
    },

    /// The session went idle and left the call
    Stopped {
        /// Chat the session belonged to
        chat_id: ChatId,
        /// What caused it
        reason: StopReason,
    },

    /// Queue length changed (tracks added/removed/reordered)
    QueueChanged {
        /// Chat the queue belongs to
        chat_id: ChatId,
        /// New queue length
        length: usize,
    },

    /// Volume changed
    VolumeChanged {
        /// Chat the session belongs to
        chat_id: ChatId,
        /// New volume level (1-200)
        level: u8,
    },

    /// An event-driven operation failed; nobody else will report it
    Error {
        /// Chat the failure happened in
        chat_id: ChatId,
        /// Error message
        message: String,
    },
}

impl PlaybackEvent {
    /// Chat the event refers to
    pub fn chat_id(&self) -> ChatId {
        match self {
            PlaybackEvent::TrackStarted { chat_id, .. }
            | PlaybackEvent::TrackChanged { chat_id, .. }
            | PlaybackEvent::Paused { chat_id }
            | PlaybackEvent::Resumed { chat_id }
            | PlaybackEvent::Stopped { chat_id, .. }
            | PlaybackEvent::QueueChanged { chat_id, .. }
            | PlaybackEvent::VolumeChanged { chat_id, .. }
            | PlaybackEvent::Error { chat_id, .. } => *chat_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_event_names_its_chat() {
        let chat = ChatId::new(-42);
        let events = [
            PlaybackEvent::Paused { chat_id: chat },
            PlaybackEvent::Stopped {
                chat_id: chat,
                reason: StopReason::QueueDrained,
            },
            PlaybackEvent::QueueChanged {
                chat_id: chat,
                length: 3,
            },
            PlaybackEvent::Error {
                chat_id: chat,
                message: "boom".into(),
            },
        ];

        assert!(events.iter().all(|e| e.chat_id() == chat));
    }
}
