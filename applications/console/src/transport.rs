//! Simulated voice-call transport
//!
//! Logs every call and fakes stream progress with tokio timers: once a
//! stream has played for its (scaled) duration a `StreamEnded` event is
//! sent, exactly as a real call would report it.

use async_trait::async_trait;
use chorus_core::{ChatId, ChorusError, StreamSource, TrackId, Transport, TransportEvent};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::config::CatalogEntry;

/// Stream length assumed for audio the catalog doesn't know
const FALLBACK_DURATION: Duration = Duration::from_secs(30);

struct ActiveStream {
    track_id: TrackId,
    remaining: Duration,
    resumed_at: Instant,
    timer: Option<JoinHandle<()>>,
}

impl ActiveStream {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

struct CallState {
    /// `None` once closed
    events: Option<mpsc::Sender<TransportEvent>>,
    in_call: HashSet<ChatId>,
    streams: HashMap<ChatId, ActiveStream>,
}

pub struct SimulatedTransport {
    time_scale: f64,
    durations: HashMap<String, Duration>,
    offline: HashSet<ChatId>,
    state: Mutex<CallState>,
}

impl SimulatedTransport {
    /// Create a transport reporting to `events`
    ///
    /// Stream lengths come from the catalog's audio urls.
    pub fn new(
        events: mpsc::Sender<TransportEvent>,
        time_scale: f64,
        catalog: &[CatalogEntry],
        offline: impl IntoIterator<Item = ChatId>,
    ) -> Self {
        Self {
            time_scale,
            durations: catalog
                .iter()
                .map(|e| (e.audio_url.clone(), Duration::from_secs(e.duration_secs)))
                .collect(),
            offline: offline.into_iter().collect(),
            state: Mutex::new(CallState {
                events: Some(events),
                in_call: HashSet::new(),
                streams: HashMap::new(),
            }),
        }
    }

    /// Drop the event sender and every pending stream timer
    ///
    /// Whoever consumes the events sees the channel close once in-flight
    /// sends finish.
    pub fn close(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.events = None;
            state.in_call.clear();
            for (_, mut stream) in state.streams.drain() {
                stream.cancel_timer();
            }
        }
    }

    /// Hang up the chat's call, as if everyone left
    ///
    /// Returns `false` if there was no call.
    pub async fn end_call(&self, chat_id: ChatId) -> chorus_core::Result<bool> {
        let (was_in_call, events) = {
            let mut state = self.lock()?;
            if let Some(mut stream) = state.streams.remove(&chat_id) {
                stream.cancel_timer();
            }
            (state.in_call.remove(&chat_id), state.events.clone())
        };

        if was_in_call {
            info!(chat_id = %chat_id, "Voice call ended");
            let events = events.ok_or_else(|| ChorusError::Other("transport closed".to_string()))?;
            events
                .send(TransportEvent::CallEnded { chat_id })
                .await
                .map_err(|_| ChorusError::Other("event channel closed".to_string()))?;
        }
        Ok(was_in_call)
    }

    /// Chats currently in a call
    pub fn calls(&self) -> Vec<ChatId> {
        let mut chats: Vec<_> = self
            .state
            .lock()
            .map(|s| s.in_call.iter().copied().collect())
            .unwrap_or_default();
        chats.sort();
        chats
    }

    fn lock(&self) -> chorus_core::Result<std::sync::MutexGuard<'_, CallState>> {
        self.state
            .lock()
            .map_err(|_| ChorusError::transport("call state poisoned"))
    }

    fn scaled(&self, duration: Duration) -> Duration {
        Duration::try_from_secs_f64(duration.as_secs_f64() * self.time_scale)
            .unwrap_or(Duration::MAX)
    }

    fn spawn_timer(
        state: &CallState,
        chat_id: ChatId,
        track_id: TrackId,
        after: Duration,
    ) -> Option<JoinHandle<()>> {
        let events = state.events.clone()?;
        Some(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if events
                .send(TransportEvent::StreamEnded { chat_id, track_id })
                .await
                .is_err()
            {
                warn!(chat_id = %chat_id, "Event channel closed before stream end");
            }
        }))
    }

    fn require_call(state: &CallState, chat_id: ChatId) -> chorus_core::Result<()> {
        if state.in_call.contains(&chat_id) {
            Ok(())
        } else {
            Err(ChorusError::NoActiveCall(chat_id.to_string()))
        }
    }
}

#[async_trait]
impl Transport for SimulatedTransport {
    async fn join(&self, chat_id: ChatId) -> chorus_core::Result<()> {
        if self.offline.contains(&chat_id) {
            return Err(ChorusError::NoActiveCall(chat_id.to_string()));
        }

        self.lock()?.in_call.insert(chat_id);
        info!(chat_id = %chat_id, "Joined voice call");
        Ok(())
    }

    async fn leave(&self, chat_id: ChatId) -> chorus_core::Result<()> {
        let mut state = self.lock()?;
        if let Some(mut stream) = state.streams.remove(&chat_id) {
            stream.cancel_timer();
        }
        state.in_call.remove(&chat_id);
        info!(chat_id = %chat_id, "Left voice call");
        Ok(())
    }

    async fn play(&self, chat_id: ChatId, source: &StreamSource) -> chorus_core::Result<()> {
        let length = self
            .durations
            .get(&source.uri)
            .copied()
            .unwrap_or(FALLBACK_DURATION);
        let remaining = self.scaled(length);

        let mut state = self.lock()?;
        Self::require_call(&state, chat_id)?;
        if let Some(mut previous) = state.streams.remove(&chat_id) {
            previous.cancel_timer();
        }

        let timer = Self::spawn_timer(&state, chat_id, source.track_id.clone(), remaining);
        state.streams.insert(
            chat_id,
            ActiveStream {
                track_id: source.track_id.clone(),
                remaining,
                resumed_at: Instant::now(),
                timer,
            },
        );
        info!(chat_id = %chat_id, track_id = %source.track_id, uri = %source.uri, "Streaming");
        Ok(())
    }

    async fn pause(&self, chat_id: ChatId) -> chorus_core::Result<()> {
        let mut state = self.lock()?;
        let stream = state
            .streams
            .get_mut(&chat_id)
            .ok_or_else(|| ChorusError::transport("nothing is streaming"))?;

        if stream.timer.is_some() {
            stream.cancel_timer();
            stream.remaining = stream.remaining.saturating_sub(stream.resumed_at.elapsed());
        }
        info!(chat_id = %chat_id, remaining = ?stream.remaining, "Stream paused");
        Ok(())
    }

    async fn resume(&self, chat_id: ChatId) -> chorus_core::Result<()> {
        let mut state = self.lock()?;
        let (track_id, remaining, paused) = state
            .streams
            .get(&chat_id)
            .map(|s| (s.track_id.clone(), s.remaining, s.timer.is_none()))
            .ok_or_else(|| ChorusError::transport("nothing is streaming"))?;

        if paused {
            let timer = Self::spawn_timer(&state, chat_id, track_id, remaining);
            if let Some(stream) = state.streams.get_mut(&chat_id) {
                stream.resumed_at = Instant::now();
                stream.timer = timer;
            }
        }
        info!(chat_id = %chat_id, "Stream resumed");
        Ok(())
    }

    async fn set_volume(&self, chat_id: ChatId, volume: u8) -> chorus_core::Result<()> {
        Self::require_call(&*self.lock()?, chat_id)?;
        info!(chat_id = %chat_id, volume, "Volume changed");
        Ok(())
    }
}
