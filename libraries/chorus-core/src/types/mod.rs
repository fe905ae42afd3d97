//! Domain types for Chorus

mod ids;
mod track;

pub use ids::{ChatId, TrackId, UserId};
pub use track::{format_duration, ResolvedAudio, SearchResult, StreamSource, Track};
