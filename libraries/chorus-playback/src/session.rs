//! Per-chat playback session
//!
//! The session is the only component that calls the transport for its chat.
//!
//! ```text
//!            start(track)           join + play ok
//!   Idle ───────────────▶ Joining ─────────────────▶ Playing ◀──┐
//!    ▲                       │                       │  ▲       │ advance(next)
//!    │      join/play failed │              pause()  │  │resume()
//!    ├───────────────────────┘                       ▼  │       │
//!    │                                              Paused ─────┘
//!    │  stop() / force_idle()  (from any state)
//!    └──────────────────────────────────────────────────
//! ```
//!
//! Invariant: `current` is set exactly when the state is `Playing` or `Paused`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chorus_core::{ChatId, Track, TrackId, Transport};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{PlaybackError, Result};
use crate::types::{PlaybackConfig, SessionState, SessionStatus};
use crate::volume::{Volume, DEFAULT_VOLUME};

/// Playback state for one chat
pub struct PlaybackSession {
    chat_id: ChatId,
    transport: Arc<dyn Transport>,
    timeout: Duration,
    initial_volume: Volume,

    state: SessionState,
    current: Option<Track>,
    volume: Volume,
    joined_at: Option<DateTime<Utc>>,
}

impl PlaybackSession {
    /// Create an idle session for `chat_id`
    pub fn new(chat_id: ChatId, transport: Arc<dyn Transport>, config: &PlaybackConfig) -> Self {
        let initial_volume = config.initial_volume();
        Self {
            chat_id,
            transport,
            timeout: config.transport_timeout(),
            initial_volume,
            state: SessionState::Idle,
            current: None,
            volume: initial_volume,
            joined_at: None,
        }
    }

    /// Join the call and start streaming `track`
    ///
    /// On failure the session is back to `Idle` with nothing current, and the
    /// caller is responsible for dropping `track` from the queue.
    pub async fn start(&mut self, track: Track) -> Result<()> {
        if self.state != SessionState::Idle {
            return Err(PlaybackError::AlreadyActive);
        }

        self.state = SessionState::Joining;
        info!(chat_id = %self.chat_id, title = %track.title, "Joining voice chat");

        if let Err(failure) = self.call("join", self.transport.join(self.chat_id)).await {
            if matches!(failure, CallFailure::TimedOut(_)) {
                // The join may still land after we gave up on it.
                let _ = self.call("leave", self.transport.leave(self.chat_id)).await;
            }
            self.state = SessionState::Idle;
            return Err(PlaybackError::JoinFailed(failure.into()));
        }

        let source = track.stream_source();
        if let Err(failure) = self.call("play", self.transport.play(self.chat_id, &source)).await {
            // Joined but silent; don't linger in the call.
            let _ = self.call("leave", self.transport.leave(self.chat_id)).await;
            self.state = SessionState::Idle;
            return Err(PlaybackError::JoinFailed(failure.into()));
        }

        if self.volume.level() != DEFAULT_VOLUME {
            let level = self.volume.level();
            if self
                .call("set_volume", self.transport.set_volume(self.chat_id, level))
                .await
                .is_err()
            {
                self.volume = Volume::default();
            }
        }

        info!(chat_id = %self.chat_id, track_id = %track.id, title = %track.title, "Playback started");
        self.state = SessionState::Playing;
        self.current = Some(track);
        self.joined_at = Some(Utc::now());
        self.check_invariant();
        Ok(())
    }

    /// Replace the current stream with `next` without leaving the call
    ///
    /// On failure the session is unchanged; the caller decides how to
    /// recover.
    pub async fn advance(&mut self, next: Track) -> Result<()> {
        if !self.state.has_current() {
            return Err(PlaybackError::NotPlaying);
        }

        let source = next.stream_source();
        self.call("play", self.transport.play(self.chat_id, &source))
            .await
            .map_err(|failure| PlaybackError::Transport(failure.into()))?;

        info!(chat_id = %self.chat_id, track_id = %next.id, title = %next.title, "Advanced to next track");
        self.state = SessionState::Playing;
        self.current = Some(next);
        self.check_invariant();
        Ok(())
    }

    /// Pause the current stream
    pub async fn pause(&mut self) -> Result<()> {
        if self.state != SessionState::Playing {
            return Err(PlaybackError::NotPlaying);
        }

        self.call("pause", self.transport.pause(self.chat_id))
            .await
            .map_err(|failure| PlaybackError::Transport(failure.into()))?;

        debug!(chat_id = %self.chat_id, "Playback paused");
        self.state = SessionState::Paused;
        Ok(())
    }

    /// Resume a paused stream
    pub async fn resume(&mut self) -> Result<()> {
        if self.state != SessionState::Paused {
            return Err(PlaybackError::NotPaused);
        }

        self.call("resume", self.transport.resume(self.chat_id))
            .await
            .map_err(|failure| PlaybackError::Transport(failure.into()))?;

        debug!(chat_id = %self.chat_id, "Playback resumed");
        self.state = SessionState::Playing;
        Ok(())
    }

    /// Leave the call and go idle
    ///
    /// Always succeeds locally; a failed `leave` is logged, not reported.
    /// Returns `false` when there was nothing to stop.
    pub async fn stop(&mut self) -> bool {
        if self.state == SessionState::Idle {
            return false;
        }

        // Failure already logged by `call`.
        let _ = self.call("leave", self.transport.leave(self.chat_id)).await;

        info!(chat_id = %self.chat_id, "Left voice chat");
        self.reset();
        true
    }

    /// Go idle without talking to the transport (the call is already gone)
    ///
    /// Returns whether the session was active.
    pub fn force_idle(&mut self) -> bool {
        let was_active = self.state != SessionState::Idle;
        self.reset();
        was_active
    }

    /// Set call volume, clamping `level` into 1-200
    ///
    /// Only legal while a track is current. The stored volume changes only
    /// when the transport accepted it.
    pub async fn set_volume(&mut self, level: u32) -> Result<Volume> {
        if self.current.is_none() {
            return Err(PlaybackError::NotPlaying);
        }

        let volume = Volume::clamped(level);
        self.call(
            "set_volume",
            self.transport.set_volume(self.chat_id, volume.level()),
        )
        .await
        .map_err(|failure| PlaybackError::Transport(failure.into()))?;

        debug!(chat_id = %self.chat_id, volume = volume.level(), "Volume set");
        self.volume = volume;
        Ok(volume)
    }

    /// Whether the session is streaming `track_id` right now (not paused)
    pub fn is_streaming(&self, track_id: &TrackId) -> bool {
        self.state == SessionState::Playing
            && self.current.as_ref().is_some_and(|t| &t.id == track_id)
    }

    /// Chat this session belongs to
    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the session is idle
    pub fn is_idle(&self) -> bool {
        self.state == SessionState::Idle
    }

    /// Track being streamed
    pub fn current(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    /// Call volume
    pub fn volume(&self) -> Volume {
        self.volume
    }

    /// When the call was joined
    pub fn joined_at(&self) -> Option<DateTime<Utc>> {
        self.joined_at
    }

    /// Snapshot for display
    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            state: self.state,
            current: self.current.clone(),
            volume: self.volume,
            joined_at: self.joined_at,
        }
    }

    fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.current = None;
        self.joined_at = None;
        // Volume belongs to the call; a new call starts from the default.
        self.volume = self.initial_volume;
        self.check_invariant();
    }

    fn check_invariant(&self) {
        debug_assert_eq!(
            self.current.is_some(),
            self.state.has_current(),
            "current track must be set exactly when playing or paused"
        );
    }

    /// Run one transport call under the configured timeout
    async fn call<F>(&self, op: &'static str, fut: F) -> std::result::Result<(), CallFailure>
    where
        F: Future<Output = chorus_core::Result<()>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                warn!(chat_id = %self.chat_id, op, error = %e, "Transport call failed");
                Err(CallFailure::Rejected(e.to_string()))
            }
            Err(_) => {
                warn!(chat_id = %self.chat_id, op, timeout = ?self.timeout, "Transport call timed out");
                Err(CallFailure::TimedOut(format!(
                    "{} timed out after {:?}",
                    op, self.timeout
                )))
            }
        }
    }
}

/// How a transport call went wrong
enum CallFailure {
    /// The transport answered with an error
    Rejected(String),
    /// No answer within the timeout; the call may still take effect
    TimedOut(String),
}

impl From<CallFailure> for String {
    fn from(failure: CallFailure) -> Self {
        match failure {
            CallFailure::Rejected(reason) | CallFailure::TimedOut(reason) => reason,
        }
    }
}

impl std::fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("chat_id", &self.chat_id)
            .field("state", &self.state)
            .field("current", &self.current.as_ref().map(|t| &t.id))
            .field("volume", &self.volume)
            .finish_non_exhaustive()
    }
}
