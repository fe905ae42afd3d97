//! Chorus Playback - Per-Chat Queue and Session Orchestration
//!
//! Keeps, for every group chat, an ordered queue of requested tracks and a
//! voice-call playback session, and keeps the two consistent while commands
//! and transport events race against each other.
//!
//! This crate provides:
//! - Bounded FIFO queues (head = current track)
//! - Session state machine (Idle → Joining → Playing ⇄ Paused)
//! - Skip / pause / resume / stop / clear / volume
//! - Automatic advance when a stream ends, with stale-event detection
//! - Search → resolve → play-or-enqueue request pipeline
//! - Playback notifications via `tokio::sync::broadcast`
//!
//! # Architecture
//!
//! `chorus-playback` never talks to a voice network or a media site itself.
//! Both are injected through the `Transport` and `Resolver` traits from
//! `chorus-core`.
//!
//! Every operation for a chat runs inside that chat's exclusive section:
//! the session lock is taken first, then the queue lock, and both are held
//! across the transport call. Different chats never contend.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use chorus_core::{ChatId, ResolvedAudio, Resolver, SearchResult, StreamSource, Transport, UserId};
//! use chorus_playback::{EventPump, Orchestrator, PlaybackConfig};
//!
//! struct Voice;
//!
//! #[async_trait]
//! impl Transport for Voice {
//!     async fn join(&self, _: ChatId) -> chorus_core::Result<()> { Ok(()) }
//!     async fn leave(&self, _: ChatId) -> chorus_core::Result<()> { Ok(()) }
//!     async fn play(&self, _: ChatId, _: &StreamSource) -> chorus_core::Result<()> { Ok(()) }
//!     async fn pause(&self, _: ChatId) -> chorus_core::Result<()> { Ok(()) }
//!     async fn resume(&self, _: ChatId) -> chorus_core::Result<()> { Ok(()) }
//!     async fn set_volume(&self, _: ChatId, _: u8) -> chorus_core::Result<()> { Ok(()) }
//! }
//!
//! struct Media;
//!
//! #[async_trait]
//! impl Resolver for Media {
//!     async fn search(&self, _: &str, _: usize) -> chorus_core::Result<Vec<SearchResult>> {
//!         Ok(Vec::new())
//!     }
//!     async fn resolve_audio(&self, url: &str) -> chorus_core::Result<ResolvedAudio> {
//!         Err(chorus_core::ChorusError::resolver(format!("cannot resolve {url}")))
//!     }
//! }
//!
//! # async fn demo() {
//! let orchestrator = Arc::new(Orchestrator::new(
//!     PlaybackConfig::default(),
//!     Arc::new(Voice),
//!     Arc::new(Media),
//! ));
//!
//! // Feed transport notifications (stream ended, call ended) back in
//! let (events_tx, events_rx) = tokio::sync::mpsc::channel(64);
//! EventPump::new(Arc::clone(&orchestrator), events_rx).spawn();
//! # drop(events_tx);
//!
//! let chat = ChatId::new(-1001);
//! match orchestrator.request(chat, "some song", UserId::new(7)).await {
//!     Ok((track, outcome)) => println!("{}: {:?}", track.title, outcome),
//!     Err(e) => println!("{e}"),
//! }
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod orchestrator;
pub mod pump;
pub mod queue;
pub mod registry;
pub mod session;
pub mod sessions;
pub mod types;
pub mod volume;

// Re-export main types
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use orchestrator::Orchestrator;
pub use pump::EventPump;
pub use queue::ChatQueue;
pub use registry::QueueRegistry;
pub use session::PlaybackSession;
pub use sessions::SessionRegistry;
pub use types::{
    EnqueueOutcome, PlaybackConfig, QueueSnapshot, QueueStats, SessionState, SessionStatus,
    SkipOutcome, StopReason,
};
pub use volume::{Volume, DEFAULT_VOLUME, MAX_VOLUME, MIN_VOLUME};
