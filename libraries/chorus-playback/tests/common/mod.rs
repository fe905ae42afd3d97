//! Shared fixtures for orchestrator integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chorus_core::{
    ChatId, ChorusError, ResolvedAudio, Resolver, SearchResult, StreamSource, Track, TrackId,
    Transport, UserId,
};
use chorus_playback::{Orchestrator, PlaybackConfig};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ===== Tracks =====

pub fn create_test_track(title: &str) -> Track {
    create_test_track_with_duration(title, 180)
}

pub fn create_test_track_with_duration(title: &str, secs: u64) -> Track {
    let slug = title.to_lowercase().replace(' ', "-");
    Track::new(
        title,
        Duration::from_secs(secs),
        format!("https://cdn.example.com/{}.m4a", slug),
        format!("https://video.example.com/watch?v={}", slug),
        UserId::new(1),
    )
}

// ===== Transport =====

/// One recorded transport call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Join(ChatId),
    Leave(ChatId),
    Play(ChatId, TrackId),
    Pause(ChatId),
    Resume(ChatId),
    SetVolume(ChatId, u8),
}

impl Call {
    pub fn chat_id(&self) -> ChatId {
        match self {
            Call::Join(c)
            | Call::Leave(c)
            | Call::Play(c, _)
            | Call::Pause(c)
            | Call::Resume(c)
            | Call::SetVolume(c, _) => *c,
        }
    }
}

/// Records every call; individual operations can be made to fail or stall
#[derive(Default)]
pub struct MockTransport {
    calls: Mutex<Vec<Call>>,
    failing: Mutex<HashSet<&'static str>>,
    delay: Mutex<Option<Duration>>,
    in_flight: Mutex<HashMap<ChatId, usize>>,
    overlapped: Mutex<bool>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every future call to `op` fail
    pub fn fail_on(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    /// Let `op` succeed again
    pub fn recover(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    /// Sleep this long inside every call
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, chat_id: ChatId) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.chat_id() == chat_id)
            .collect()
    }

    /// Track ids passed to `play` for `chat_id`, in order
    pub fn plays(&self, chat_id: ChatId) -> Vec<TrackId> {
        self.calls_for(chat_id)
            .into_iter()
            .filter_map(|c| match c {
                Call::Play(_, id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn joins(&self, chat_id: ChatId) -> usize {
        self.calls_for(chat_id)
            .iter()
            .filter(|c| matches!(c, Call::Join(_)))
            .count()
    }

    pub fn leaves(&self, chat_id: ChatId) -> usize {
        self.calls_for(chat_id)
            .iter()
            .filter(|c| matches!(c, Call::Leave(_)))
            .count()
    }

    /// Whether two calls for the same chat were ever in flight together
    pub fn saw_overlap(&self) -> bool {
        *self.overlapped.lock().unwrap()
    }

    async fn record(&self, op: &'static str, call: Call) -> chorus_core::Result<()> {
        let chat_id = call.chat_id();
        {
            let mut in_flight = self.in_flight.lock().unwrap();
            let count = in_flight.entry(chat_id).or_insert(0);
            if *count > 0 {
                *self.overlapped.lock().unwrap() = true;
            }
            *count += 1;
        }
        // Released on drop too, so a call abandoned by a timeout stops counting
        let _in_flight = InFlight {
            counts: &self.in_flight,
            chat_id,
        };

        self.calls.lock().unwrap().push(call);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().unwrap().contains(op) {
            if op == "join" {
                return Err(ChorusError::NoActiveCall(chat_id.to_string()));
            }
            return Err(ChorusError::transport(format!("{} rejected", op)));
        }
        Ok(())
    }
}

struct InFlight<'a> {
    counts: &'a Mutex<HashMap<ChatId, usize>>,
    chat_id: ChatId,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Ok(mut counts) = self.counts.lock() {
            if let Some(count) = counts.get_mut(&self.chat_id) {
                *count = count.saturating_sub(1);
            }
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn join(&self, chat_id: ChatId) -> chorus_core::Result<()> {
        self.record("join", Call::Join(chat_id)).await
    }

    async fn leave(&self, chat_id: ChatId) -> chorus_core::Result<()> {
        self.record("leave", Call::Leave(chat_id)).await
    }

    async fn play(&self, chat_id: ChatId, source: &StreamSource) -> chorus_core::Result<()> {
        self.record("play", Call::Play(chat_id, source.track_id.clone()))
            .await
    }

    async fn pause(&self, chat_id: ChatId) -> chorus_core::Result<()> {
        self.record("pause", Call::Pause(chat_id)).await
    }

    async fn resume(&self, chat_id: ChatId) -> chorus_core::Result<()> {
        self.record("resume", Call::Resume(chat_id)).await
    }

    async fn set_volume(&self, chat_id: ChatId, volume: u8) -> chorus_core::Result<()> {
        self.record("set_volume", Call::SetVolume(chat_id, volume))
            .await
    }
}

// ===== Resolver =====

/// Fixed catalog; searches match titles case-insensitively
#[derive(Default)]
pub struct StaticResolver {
    entries: Vec<(SearchResult, ResolvedAudio)>,
    fail_search: bool,
    fail_resolve: bool,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry whose search and resolved durations are both `secs`
    pub fn with(self, title: &str, secs: u64) -> Self {
        self.with_durations(title, secs, secs)
    }

    /// Add an entry whose resolved duration differs from the searched one
    pub fn with_durations(mut self, title: &str, search_secs: u64, resolved_secs: u64) -> Self {
        let slug = title.to_lowercase().replace(' ', "-");
        let origin_url = format!("https://video.example.com/watch?v={}", slug);
        self.entries.push((
            SearchResult {
                id: slug.clone(),
                title: title.to_string(),
                duration: Duration::from_secs(search_secs),
                origin_url: origin_url.clone(),
                thumbnail_url: None,
            },
            ResolvedAudio {
                title: title.to_string(),
                duration: Duration::from_secs(resolved_secs),
                origin_url,
                thumbnail_url: Some(format!("https://img.example.com/{}.jpg", slug)),
                source_uri: format!("https://cdn.example.com/{}.m4a", slug),
            },
        ));
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn failing_resolve(mut self) -> Self {
        self.fail_resolve = true;
        self
    }
}

#[async_trait]
impl Resolver for StaticResolver {
    async fn search(&self, query: &str, limit: usize) -> chorus_core::Result<Vec<SearchResult>> {
        if self.fail_search {
            return Err(ChorusError::resolver("search backend unavailable"));
        }

        let needle = query.to_lowercase();
        Ok(self
            .entries
            .iter()
            .filter(|(result, _)| result.title.to_lowercase().contains(&needle))
            .take(limit)
            .map(|(result, _)| result.clone())
            .collect())
    }

    async fn resolve_audio(&self, origin_url: &str) -> chorus_core::Result<ResolvedAudio> {
        if self.fail_resolve {
            return Err(ChorusError::resolver("extraction failed"));
        }

        self.entries
            .iter()
            .find(|(_, audio)| audio.origin_url == origin_url)
            .map(|(_, audio)| audio.clone())
            .ok_or_else(|| ChorusError::resolver(format!("unknown url {}", origin_url)))
    }
}

// ===== Orchestrator =====

pub fn orchestrator(transport: &Arc<MockTransport>) -> Orchestrator {
    orchestrator_with(transport, StaticResolver::new(), PlaybackConfig::default())
}

pub fn orchestrator_with(
    transport: &Arc<MockTransport>,
    resolver: StaticResolver,
    config: PlaybackConfig,
) -> Orchestrator {
    Orchestrator::new(config, transport.clone(), Arc::new(resolver))
}
