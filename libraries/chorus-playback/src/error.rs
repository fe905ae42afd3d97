//! Error types for playback orchestration

use chorus_core::ChorusError;
use thiserror::Error;

/// Playback errors
///
/// Every outcome the command layer has to render a message for is a variant
/// here; nothing in this crate panics on a failed operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// Queue reached its capacity; nothing was evicted
    #[error("Queue is full ({capacity} tracks)")]
    QueueFull {
        /// Maximum number of tracks the queue holds
        capacity: usize,
    },

    /// Operation requires a playing (or paused) session
    #[error("Nothing is playing")]
    NotPlaying,

    /// Resume requires a paused session
    #[error("Playback is not paused")]
    NotPaused,

    /// `start` called on a session that is not idle
    #[error("Session is already active")]
    AlreadyActive,

    /// Joining the call or starting the first stream failed
    #[error("Failed to join voice chat: {0}")]
    JoinFailed(String),

    /// Any other transport call failed or timed out
    #[error("Transport error: {0}")]
    Transport(String),

    /// Resolver could not extract audio
    #[error("Resolver error: {0}")]
    Resolver(String),

    /// Search came back empty
    #[error("No results found for: {0}")]
    NoResults(String),

    /// Requested track is longer than the configured limit
    #[error("Track is {duration_secs}s long, limit is {limit_secs}s")]
    DurationLimitExceeded {
        /// Length of the requested track
        duration_secs: u64,
        /// Configured maximum length
        limit_secs: u64,
    },

    /// Volume outside 1-200
    #[error("Invalid volume: {0} (expected 1-200)")]
    InvalidVolume(u32),

    /// Queue position out of range or not editable
    #[error("Invalid queue position: {0}")]
    InvalidPosition(usize),
}

impl From<ChorusError> for PlaybackError {
    fn from(err: ChorusError) -> Self {
        match err {
            ChorusError::Resolver(msg) => Self::Resolver(msg),
            ChorusError::NoResults(query) => Self::NoResults(query),
            other => Self::Transport(other.to_string()),
        }
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
