/// Track types
use super::ids::{TrackId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A requested item in a chat's queue
///
/// Built once when the request is accepted and never mutated afterwards;
/// the queue owns it until it is consumed or cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Identity of this request (referenced by stream-ended events)
    pub id: TrackId,

    /// Display title
    pub title: String,

    /// Playback length
    pub duration: Duration,

    /// Playable audio location handed to the transport
    pub source_uri: String,

    /// Canonical page link
    pub origin_url: String,

    /// Thumbnail link, when the resolver provided one
    pub thumbnail_url: Option<String>,

    /// Who asked for it
    pub requested_by: UserId,

    /// When the request was accepted
    pub enqueued_at: DateTime<Utc>,
}

impl Track {
    /// Create a new track with a fresh id, enqueued now
    pub fn new(
        title: impl Into<String>,
        duration: Duration,
        source_uri: impl Into<String>,
        origin_url: impl Into<String>,
        requested_by: UserId,
    ) -> Self {
        Self {
            id: TrackId::generate(),
            title: title.into(),
            duration,
            source_uri: source_uri.into(),
            origin_url: origin_url.into(),
            thumbnail_url: None,
            requested_by,
            enqueued_at: Utc::now(),
        }
    }

    /// Build a track from resolver output
    pub fn from_resolved(audio: ResolvedAudio, requested_by: UserId) -> Self {
        Self {
            id: TrackId::generate(),
            title: audio.title,
            duration: audio.duration,
            source_uri: audio.source_uri,
            origin_url: audio.origin_url,
            thumbnail_url: audio.thumbnail_url,
            requested_by,
            enqueued_at: Utc::now(),
        }
    }

    /// The stream descriptor handed to the transport for this track
    pub fn stream_source(&self) -> StreamSource {
        StreamSource {
            track_id: self.id.clone(),
            uri: self.source_uri.clone(),
        }
    }

    /// Duration as `MM:SS`, or `HH:MM:SS` past the hour
    pub fn display_duration(&self) -> String {
        format_duration(self.duration)
    }
}

/// Format a duration as `MM:SS`, or `HH:MM:SS` when it reaches an hour
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let (minutes, seconds) = (total / 60, total % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// One entry of a resolver search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Resolver-specific id (e.g. video id)
    pub id: String,

    /// Display title
    pub title: String,

    /// Reported length
    pub duration: Duration,

    /// Canonical page link, passed back to `Resolver::resolve_audio`
    pub origin_url: String,

    /// Thumbnail link
    pub thumbnail_url: Option<String>,
}

/// Metadata plus playable audio location for one origin URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAudio {
    /// Display title
    pub title: String,

    /// Reported length
    pub duration: Duration,

    /// Canonical page link
    pub origin_url: String,

    /// Thumbnail link
    pub thumbnail_url: Option<String>,

    /// Playable audio location
    pub source_uri: String,
}

/// What the transport is asked to stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSource {
    /// Track the stream belongs to; echoed back in `StreamEnded`
    pub track_id: TrackId,

    /// Playable audio location
    pub uri: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved() -> ResolvedAudio {
        ResolvedAudio {
            title: "Song".to_string(),
            duration: Duration::from_secs(200),
            origin_url: "https://video.example.com/watch?v=abc".to_string(),
            thumbnail_url: Some("https://img.example.com/abc.jpg".to_string()),
            source_uri: "https://cdn.example.com/abc.m4a".to_string(),
        }
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(Duration::from_secs(0)), "00:00");
        assert_eq!(format_duration(Duration::from_secs(59)), "00:59");
        assert_eq!(format_duration(Duration::from_secs(61)), "01:01");
        assert_eq!(format_duration(Duration::from_secs(3600)), "01:00:00");
        assert_eq!(format_duration(Duration::from_secs(3725)), "01:02:05");
    }

    #[test]
    fn from_resolved_keeps_metadata() {
        let track = Track::from_resolved(resolved(), UserId::new(7));

        assert_eq!(track.title, "Song");
        assert_eq!(track.duration, Duration::from_secs(200));
        assert_eq!(track.source_uri, "https://cdn.example.com/abc.m4a");
        assert_eq!(track.requested_by, UserId::new(7));
        assert!(track.thumbnail_url.is_some());
    }

    #[test]
    fn same_song_twice_gets_distinct_identity() {
        let a = Track::from_resolved(resolved(), UserId::new(1));
        let b = Track::from_resolved(resolved(), UserId::new(1));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn stream_source_carries_track_identity() {
        let track = Track::from_resolved(resolved(), UserId::new(1));
        let source = track.stream_source();

        assert_eq!(source.track_id, track.id);
        assert_eq!(source.uri, track.source_uri);
    }
}
