//! Call volume
//!
//! Volume is a percentage of the transport's nominal level, 1-200.
//! 0 is not a valid level; pausing is how a chat goes silent.

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};

/// Lowest accepted volume
pub const MIN_VOLUME: u8 = 1;

/// Highest accepted volume
pub const MAX_VOLUME: u8 = 200;

/// Default call volume
pub const DEFAULT_VOLUME: u8 = 100;

/// Validated call volume (1-200)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u8")]
pub struct Volume(u8);

impl Volume {
    /// Accept a user-supplied level, rejecting anything outside 1-200
    pub fn try_new(level: u32) -> Result<Self> {
        if (u32::from(MIN_VOLUME)..=u32::from(MAX_VOLUME)).contains(&level) {
            Ok(Self(level as u8))
        } else {
            Err(PlaybackError::InvalidVolume(level))
        }
    }

    /// Clamp any level into 1-200
    pub fn clamped(level: u32) -> Self {
        Self(level.clamp(u32::from(MIN_VOLUME), u32::from(MAX_VOLUME)) as u8)
    }

    /// Get the level (1-200)
    pub fn level(self) -> u8 {
        self.0
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self(DEFAULT_VOLUME)
    }
}

impl TryFrom<u32> for Volume {
    type Error = PlaybackError;

    fn try_from(level: u32) -> Result<Self> {
        Self::try_new(level)
    }
}

impl From<Volume> for u8 {
    fn from(volume: Volume) -> Self {
        volume.0
    }
}
