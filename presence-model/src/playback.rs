//! Playback state enumeration

use std::fmt;

use serde::{Deserialize, Serialize};

/// Current playback state of a media player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Currently playing media
    Playing,
    /// Playback is paused
    Paused,
    /// Playback is stopped
    Stopped,
    /// The player reported something outside the MPRIS vocabulary
    Unknown,
}

impl PlaybackState {
    /// All states, in selection priority order.
    pub const ALL: [PlaybackState; 4] = [
        PlaybackState::Playing,
        PlaybackState::Paused,
        PlaybackState::Stopped,
        PlaybackState::Unknown,
    ];

    /// Parse from an MPRIS `PlaybackStatus` string.
    ///
    /// The spec allows exactly "Playing", "Paused" and "Stopped"; anything
    /// else maps to `Unknown` rather than failing the poll.
    pub fn from_status(status: &str) -> Self {
        match status {
            "Playing" => PlaybackState::Playing,
            "Paused" => PlaybackState::Paused,
            "Stopped" => PlaybackState::Stopped,
            _ => PlaybackState::Unknown,
        }
    }

    /// Display string, matching the MPRIS vocabulary.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Unknown => "Unknown",
        }
    }

    /// Lowercase asset key used when no player-specific icon exists.
    pub fn image_key(&self) -> &'static str {
        match self {
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Stopped => "stopped",
            PlaybackState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
