//! Chorus Core
//!
//! Domain types, collaborator traits, and error handling shared by every
//! Chorus crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `ChatId`, `UserId`, `TrackId`, `Track`, `SearchResult`
//! - **Collaborator Traits**: `Resolver` (search + audio extraction) and
//!   `Transport` (voice-call media control)
//! - **Error Handling**: Unified `ChorusError` and `Result` types
//!
//! Nothing here performs I/O. Implementations of the traits live with the
//! application that embeds the playback core.
//!
//! # Example
//!
//! ```rust
//! use chorus_core::types::{ChatId, Track, UserId};
//! use std::time::Duration;
//!
//! let track = Track::new(
//!     "Intro",
//!     Duration::from_secs(95),
//!     "https://cdn.example.com/intro.m4a",
//!     "https://video.example.com/watch?v=intro",
//!     UserId::new(42),
//! );
//!
//! assert_eq!(track.display_duration(), "01:35");
//! assert_eq!(ChatId::new(-100).to_string(), "-100");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{ChorusError, Result};
pub use traits::{Resolver, Transport, TransportEvent};
pub use types::{ChatId, ResolvedAudio, SearchResult, StreamSource, Track, TrackId, UserId};
