//! Core types for playback orchestration

use chorus_core::Track;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::volume::{Volume, DEFAULT_VOLUME};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Not in a call, nothing current
    Idle,

    /// Joining the call and starting the first stream
    Joining,

    /// Streaming the current track
    Playing,

    /// Current track paused mid-stream
    Paused,
}

impl SessionState {
    /// Whether a track is current (playing or paused)
    pub fn has_current(self) -> bool {
        matches!(self, SessionState::Playing | SessionState::Paused)
    }
}

/// Queue statistics for the `/queue` view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Tracks in the queue, current one included
    pub size: usize,

    /// Sum of all durations, current one included
    pub total_duration: Duration,

    /// Configured capacity
    pub capacity: usize,

    /// Free slots
    pub remaining: usize,
}

/// Point-in-time copy of a chat's queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    /// Tracks in play order; position 0 is current
    pub tracks: Vec<Track>,

    /// Aggregate statistics
    pub stats: QueueStats,
}

/// Point-in-time copy of a chat's session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    /// State machine position
    pub state: SessionState,

    /// Track being streamed, if any
    pub current: Option<Track>,

    /// Call volume
    pub volume: Volume,

    /// When the call was joined
    pub joined_at: Option<DateTime<Utc>>,
}

/// Result of `Orchestrator::play_or_enqueue`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnqueueOutcome {
    /// Queue was empty and the session idle; the track is now streaming
    StartedPlaying,

    /// Track appended behind the current one
    Enqueued {
        /// 0-based queue position
        position: usize,
    },
}

/// Result of `Orchestrator::skip`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkipOutcome {
    /// The next queued track is now streaming
    Advanced(Track),

    /// Nothing was left; the session left the call
    QueueDrainedAndStopped,
}

/// Why a session went idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// `/stop`
    User,

    /// Last track finished or was skipped
    QueueDrained,

    /// `/clear` while playing
    QueueCleared,

    /// Voice call ended underneath us
    CallEnded,

    /// Starting the next stream failed
    TransportFailure,
}

/// Configuration for the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Per-chat queue capacity (default: 50)
    pub queue_capacity: usize,

    /// Volume applied to new sessions (default: 100)
    pub default_volume: u8,

    /// Longest accepted track in seconds (default: 3 hours)
    pub duration_limit_secs: u64,

    /// Upper bound on any single transport call in milliseconds (default: 15s)
    pub transport_timeout_ms: u64,

    /// Results returned by `Orchestrator::search` (default: 5)
    pub search_limit: usize,
}

impl PlaybackConfig {
    /// Transport timeout as a `Duration`
    pub fn transport_timeout(&self) -> Duration {
        Duration::from_millis(self.transport_timeout_ms)
    }

    /// Default volume, clamped into 1-200
    pub fn initial_volume(&self) -> Volume {
        Volume::clamped(u32::from(self.default_volume))
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 50,
            default_volume: DEFAULT_VOLUME,
            duration_limit_secs: 180 * 60,
            transport_timeout_ms: 15_000,
            search_limit: 5,
        }
    }
}
