//! Playback orchestrator - the public entry point
//!
//! Combines the queue and session registries. Every operation for a chat
//! runs inside that chat's exclusive section (session lock, then queue
//! lock, always in that order), held across the full transport call.
//! Chats never wait on each other.

use std::sync::Arc;
use std::time::Duration;

use chorus_core::{
    ChatId, ChorusError, Resolver, SearchResult, Track, TrackId, Transport, TransportEvent, UserId,
};
use tokio::sync::{broadcast, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::error::{PlaybackError, Result};
use crate::events::PlaybackEvent;
use crate::queue::ChatQueue;
use crate::registry::QueueRegistry;
use crate::session::PlaybackSession;
use crate::sessions::SessionRegistry;
use crate::types::{
    EnqueueOutcome, PlaybackConfig, QueueSnapshot, SessionStatus, SkipOutcome, StopReason,
};
use crate::volume::Volume;

/// Buffered notifications per subscriber before the oldest are dropped
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A chat's queue and session, locked together
struct ChatSection {
    chat_id: ChatId,
    session: OwnedMutexGuard<PlaybackSession>,
    queue: OwnedMutexGuard<ChatQueue>,
}

/// Per-chat queue + playback coordinator
///
/// The orchestrator is the only component that reads a chat's queue and
/// writes its session (or vice versa), which keeps the two from diverging.
/// Share it behind an `Arc`; every method takes `&self`.
pub struct Orchestrator {
    config: PlaybackConfig,
    queues: QueueRegistry,
    sessions: SessionRegistry,
    resolver: Arc<dyn Resolver>,
    events: broadcast::Sender<PlaybackEvent>,
}

impl Orchestrator {
    /// Create an orchestrator driving `transport` and resolving through `resolver`
    pub fn new(
        config: PlaybackConfig,
        transport: Arc<dyn Transport>,
        resolver: Arc<dyn Resolver>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            queues: QueueRegistry::new(config.queue_capacity),
            sessions: SessionRegistry::new(transport, config.clone()),
            config,
            resolver,
            events,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Subscribe to playback notifications
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Search for `query` and queue the first result (the `/play` flow)
    ///
    /// Resolver failures abort before the queue or session is touched.
    pub async fn request(
        &self,
        chat_id: ChatId,
        query: &str,
        requested_by: UserId,
    ) -> Result<(Track, EnqueueOutcome)> {
        let query = query.trim();
        let results = match self.resolver.search(query, 1).await {
            Ok(results) => results,
            Err(e) => {
                warn!(chat_id = %chat_id, query, error = %e, "Search failed");
                Vec::new()
            }
        };

        let Some(first) = results.into_iter().next() else {
            return Err(PlaybackError::NoResults(query.to_string()));
        };

        self.request_result(chat_id, first, requested_by).await
    }

    /// Queue a result previously returned by `search`
    pub async fn request_result(
        &self,
        chat_id: ChatId,
        result: SearchResult,
        requested_by: UserId,
    ) -> Result<(Track, EnqueueOutcome)> {
        self.check_duration(result.duration)?;

        let audio = self
            .resolver
            .resolve_audio(&result.origin_url)
            .await
            .map_err(|e| match e {
                ChorusError::Resolver(msg) => PlaybackError::Resolver(msg),
                other => PlaybackError::Resolver(other.to_string()),
            })?;

        // Extraction may report a more precise length than the search did.
        self.check_duration(audio.duration)?;

        let track = Track::from_resolved(audio, requested_by);
        let outcome = self.play_or_enqueue(chat_id, track.clone()).await?;
        Ok((track, outcome))
    }

    /// Search results for the `/search` flow; failures read as "no results"
    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        match self.resolver.search(query.trim(), self.config.search_limit).await {
            Ok(results) => results,
            Err(e) => {
                warn!(query, error = %e, "Search failed");
                Vec::new()
            }
        }
    }

    fn check_duration(&self, duration: Duration) -> Result<()> {
        let limit_secs = self.config.duration_limit_secs;
        if duration.as_secs() > limit_secs {
            return Err(PlaybackError::DurationLimitExceeded {
                duration_secs: duration.as_secs(),
                limit_secs,
            });
        }
        Ok(())
    }

    // ========================================================================
    // Queue + playback
    // ========================================================================

    /// Start `track` if the chat is silent, otherwise queue it
    ///
    /// If starting fails the track is removed again and the queue is left as
    /// it was (`JoinFailed`).
    pub async fn play_or_enqueue(&self, chat_id: ChatId, track: Track) -> Result<EnqueueOutcome> {
        let mut section = self.enter(chat_id).await;
        let start_now = section.queue.is_empty() && section.session.is_idle();

        let position = section.queue.enqueue(track.clone())?;
        if !start_now {
            info!(chat_id = %chat_id, position, title = %track.title, "Track queued");
            self.emit(PlaybackEvent::QueueChanged {
                chat_id,
                length: section.queue.len(),
            });
            return Ok(EnqueueOutcome::Enqueued { position });
        }

        match section.session.start(track.clone()).await {
            Ok(()) => {
                self.emit(PlaybackEvent::TrackStarted { chat_id, track });
                Ok(EnqueueOutcome::StartedPlaying)
            }
            Err(err) => {
                section.queue.pop_front();
                warn!(chat_id = %chat_id, error = %err, "Could not start playback");
                Err(err)
            }
        }
    }

    /// Drop the current track and stream the next one, or stop if none is left
    pub async fn skip(&self, chat_id: ChatId) -> Result<SkipOutcome> {
        let mut section = self.enter(chat_id).await;
        self.advance_locked(&mut section).await
    }

    /// Pause the current stream
    pub async fn pause(&self, chat_id: ChatId) -> Result<()> {
        let mut section = self.enter(chat_id).await;
        section.session.pause().await?;
        self.emit(PlaybackEvent::Paused { chat_id });
        Ok(())
    }

    /// Resume a paused stream
    pub async fn resume(&self, chat_id: ChatId) -> Result<()> {
        let mut section = self.enter(chat_id).await;
        section.session.resume().await?;
        self.emit(PlaybackEvent::Resumed { chat_id });
        Ok(())
    }

    /// Leave the call and empty the queue
    ///
    /// Returns `false` when nothing was playing.
    pub async fn stop(&self, chat_id: ChatId) -> bool {
        let mut section = self.enter(chat_id).await;
        let stopped = section.session.stop().await;
        section.queue.clear();

        if stopped {
            self.emit(PlaybackEvent::Stopped {
                chat_id,
                reason: StopReason::User,
            });
        }
        stopped
    }

    /// Empty the queue; an active session stops with it
    ///
    /// Returns `false` when there was nothing to clear.
    pub async fn clear_queue(&self, chat_id: ChatId) -> bool {
        let mut section = self.enter(chat_id).await;
        let cleared = section.queue.clear();

        if section.session.stop().await {
            self.emit(PlaybackEvent::Stopped {
                chat_id,
                reason: StopReason::QueueCleared,
            });
        } else if cleared {
            self.emit(PlaybackEvent::QueueChanged { chat_id, length: 0 });
        }
        cleared
    }

    /// Set call volume (1-200)
    ///
    /// Out-of-range levels are rejected before the session is consulted.
    pub async fn set_volume(&self, chat_id: ChatId, level: u32) -> Result<Volume> {
        let volume = Volume::try_new(level)?;

        let mut section = self.enter(chat_id).await;
        let applied = section.session.set_volume(u32::from(volume.level())).await?;
        self.emit(PlaybackEvent::VolumeChanged {
            chat_id,
            level: applied.level(),
        });
        Ok(applied)
    }

    /// Remove a queued (not current) track
    pub async fn remove_from_queue(&self, chat_id: ChatId, position: usize) -> Result<Track> {
        if position == 0 {
            return Err(PlaybackError::InvalidPosition(0));
        }

        let mut section = self.enter(chat_id).await;
        let removed = section.queue.remove(position)?;
        self.emit(PlaybackEvent::QueueChanged {
            chat_id,
            length: section.queue.len(),
        });
        Ok(removed)
    }

    /// Reorder queued (not current) tracks
    pub async fn move_in_queue(&self, chat_id: ChatId, from: usize, to: usize) -> Result<()> {
        if from == 0 || to == 0 {
            return Err(PlaybackError::InvalidPosition(0));
        }

        let mut section = self.enter(chat_id).await;
        section.queue.move_item(from, to)?;
        self.emit(PlaybackEvent::QueueChanged {
            chat_id,
            length: section.queue.len(),
        });
        Ok(())
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Copy of the chat's queue
    pub async fn queue_snapshot(&self, chat_id: ChatId) -> QueueSnapshot {
        let section = self.enter(chat_id).await;
        QueueSnapshot {
            tracks: section.queue.iter().cloned().collect(),
            stats: section.queue.stats(),
        }
    }

    /// Copy of the chat's session state
    pub async fn status(&self, chat_id: ChatId) -> SessionStatus {
        let section = self.enter(chat_id).await;
        section.session.status()
    }

    /// Whether a track is streaming (not paused)
    pub async fn is_playing(&self, chat_id: ChatId) -> bool {
        self.status(chat_id).await.state == crate::types::SessionState::Playing
    }

    /// Whether the session is in the call (playing or paused)
    pub async fn is_in_call(&self, chat_id: ChatId) -> bool {
        self.status(chat_id).await.state.has_current()
    }

    /// Chats whose session is not idle
    pub async fn active_chats(&self) -> Vec<ChatId> {
        let mut active = Vec::new();
        for chat_id in self.sessions.chat_ids().await {
            if let Some(session) = self.sessions.get(chat_id).await {
                if !session.lock().await.is_idle() {
                    active.push(chat_id);
                }
            }
        }
        active
    }

    // ========================================================================
    // Transport events
    // ========================================================================

    /// Dispatch a transport notification to its handler
    pub async fn handle_transport_event(&self, event: TransportEvent) {
        match event {
            TransportEvent::StreamEnded { chat_id, track_id } => {
                self.on_stream_ended(chat_id, &track_id).await;
            }
            TransportEvent::CallEnded { chat_id } => self.on_call_ended(chat_id).await,
        }
    }

    /// A stream finished on its own; advance like a skip would
    ///
    /// Dropped silently unless `track_id` is still the streaming track: a
    /// skip or stop that won the race already moved the session on.
    pub async fn on_stream_ended(&self, chat_id: ChatId, track_id: &TrackId) {
        let mut section = self.enter(chat_id).await;
        if !section.session.is_streaming(track_id) {
            debug!(chat_id = %chat_id, track_id = %track_id, "Ignoring stale stream-ended event");
            return;
        }

        info!(chat_id = %chat_id, track_id = %track_id, "Stream ended");
        if let Err(err) = self.advance_locked(&mut section).await {
            warn!(chat_id = %chat_id, error = %err, "Automatic advance failed");
            self.emit(PlaybackEvent::Error {
                chat_id,
                message: err.to_string(),
            });
        }
    }

    /// The voice call ended; tear everything down for the chat
    pub async fn on_call_ended(&self, chat_id: ChatId) {
        let mut section = self.enter(chat_id).await;
        let was_active = section.session.force_idle();
        let cleared = section.queue.clear();

        info!(chat_id = %chat_id, was_active, "Voice call ended");
        if was_active || cleared {
            self.emit(PlaybackEvent::Stopped {
                chat_id,
                reason: StopReason::CallEnded,
            });
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Lock the chat's session, then its queue
    async fn enter(&self, chat_id: ChatId) -> ChatSection {
        let session = self.sessions.get_or_create(chat_id).await.lock_owned().await;
        let queue = self.queues.get_or_create(chat_id).await.lock_owned().await;
        ChatSection {
            chat_id,
            session,
            queue,
        }
    }

    /// Pop the current track and move the session to the next one
    ///
    /// Shared by user skips and natural stream ends. Must run inside the
    /// section so two advances can never pop the same front.
    async fn advance_locked(&self, section: &mut ChatSection) -> Result<SkipOutcome> {
        let chat_id = section.chat_id;
        if !section.session.state().has_current() {
            return Err(PlaybackError::NotPlaying);
        }

        let finished = section.queue.pop_front();
        debug_assert_eq!(
            finished.as_ref().map(|t| &t.id),
            section.session.current().map(|t| &t.id),
            "queue front must be the current track"
        );
        let previous_track_id = finished.map(|t| t.id);

        let Some(next) = section.queue.peek_front().cloned() else {
            section.session.stop().await;
            info!(chat_id = %chat_id, "Queue drained, playback stopped");
            self.emit(PlaybackEvent::Stopped {
                chat_id,
                reason: StopReason::QueueDrained,
            });
            return Ok(SkipOutcome::QueueDrainedAndStopped);
        };

        match section.session.advance(next.clone()).await {
            Ok(()) => {
                self.emit(PlaybackEvent::TrackChanged {
                    chat_id,
                    previous_track_id,
                    track: next.clone(),
                });
                self.emit(PlaybackEvent::QueueChanged {
                    chat_id,
                    length: section.queue.len(),
                });
                Ok(SkipOutcome::Advanced(next))
            }
            Err(err) => {
                // The call is still on the old stream; leave rather than
                // keep playing audio the queue no longer holds.
                section.queue.clear();
                section.session.stop().await;
                self.emit(PlaybackEvent::Stopped {
                    chat_id,
                    reason: StopReason::TransportFailure,
                });
                Err(err)
            }
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
