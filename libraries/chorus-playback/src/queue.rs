//! Per-chat bounded queue
//!
//! Insertion order is play order. Position 0, when present, is the track
//! that is currently playing or about to play; the queue itself knows
//! nothing about playback status.
//!
//! ```text
//! Position 0:  Track A   <- current
//! ─────────────────────────────
//! Position 1:  Track B   <- next
//! Position 2:  Track C
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use chorus_core::Track;

use crate::error::{PlaybackError, Result};
use crate::types::QueueStats;

/// Bounded, ordered collection of tracks for one chat
///
/// Pure data structure: no I/O and no locking of its own. Callers serialize
/// access through the chat's exclusive section.
#[derive(Debug, Clone)]
pub struct ChatQueue {
    items: VecDeque<Track>,
    capacity: usize,
}

impl ChatQueue {
    /// Create an empty queue holding at most `capacity` tracks
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::new(),
            capacity,
        }
    }

    /// Append a track, returning its 0-based position
    ///
    /// A full queue is left untouched and reported as `QueueFull`; nothing
    /// is ever evicted to make room.
    pub fn enqueue(&mut self, track: Track) -> Result<usize> {
        if self.items.len() >= self.capacity {
            return Err(PlaybackError::QueueFull {
                capacity: self.capacity,
            });
        }

        self.items.push_back(track);
        Ok(self.items.len() - 1)
    }

    /// Track at position 0
    pub fn peek_front(&self) -> Option<&Track> {
        self.items.front()
    }

    /// Remove and return position 0
    pub fn pop_front(&mut self) -> Option<Track> {
        self.items.pop_front()
    }

    /// Empty the queue
    ///
    /// Returns whether anything was removed, so callers can tell "cleared"
    /// from "nothing to clear".
    pub fn clear(&mut self) -> bool {
        let had_items = !self.items.is_empty();
        self.items.clear();
        had_items
    }

    /// Remove the track at `position`
    pub fn remove(&mut self, position: usize) -> Result<Track> {
        self.items
            .remove(position)
            .ok_or(PlaybackError::InvalidPosition(position))
    }

    /// Move the track at `from` to `to`, shifting the tracks in between
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.items.len();
        if from >= len {
            return Err(PlaybackError::InvalidPosition(from));
        }
        if to >= len {
            return Err(PlaybackError::InvalidPosition(to));
        }
        if from == to {
            return Ok(());
        }

        if let Some(track) = self.items.remove(from) {
            self.items.insert(to, track);
        }
        Ok(())
    }

    /// Tracks in play order
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.items.iter()
    }

    /// Aggregate statistics, current track included
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            size: self.items.len(),
            total_duration: self.items.iter().map(|t| t.duration).sum::<Duration>(),
            capacity: self.capacity,
            remaining: self.capacity.saturating_sub(self.items.len()),
        }
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
