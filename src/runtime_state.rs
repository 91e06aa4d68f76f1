use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::services::playlist::PlaylistId;

/// Coarse playback status shown to operators.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    /// Idle logo on screen
    #[default]
    Idle,

    /// A playlist is running
    Playing,

    /// The last transition failed; the idle logo was attempted as fallback
    Error,
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackStatus::Idle => write!(f, "idle"),
            PlaybackStatus::Playing => write!(f, "playing"),
            PlaybackStatus::Error => write!(f, "error"),
        }
    }
}

/// Persisted playback state, a single row that survives restarts
///
/// Mutated only by the playback components after a state change and read
/// back at startup to resume whatever was on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlaybackState {
    /// Playlist currently (or last) driven by the player
    pub active_playlist_id: Option<PlaylistId>,

    /// Current status
    pub status: PlaybackStatus,

    /// Last time this state was updated
    pub last_changed_at: DateTime<Utc>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::idle()
    }
}

impl PlaybackState {
    /// Idle logo, no active playlist.
    pub fn idle() -> Self {
        Self {
            active_playlist_id: None,
            status: PlaybackStatus::Idle,
            last_changed_at: Utc::now(),
        }
    }

    /// Playlist `id` running.
    pub fn playing(id: PlaylistId) -> Self {
        Self {
            active_playlist_id: Some(id),
            status: PlaybackStatus::Playing,
            last_changed_at: Utc::now(),
        }
    }

    /// Failed transition; keeps the playlist that was being started for diagnostics.
    pub fn error(id: Option<PlaylistId>) -> Self {
        Self {
            active_playlist_id: id,
            status: PlaybackStatus::Error,
            last_changed_at: Utc::now(),
        }
    }

    /// Playlist to resume at startup, if the player was playing when the process stopped.
    pub fn resumable_playlist(&self) -> Option<PlaylistId> {
        match self.status {
            PlaybackStatus::Playing => self.active_playlist_id,
            PlaybackStatus::Idle | PlaybackStatus::Error => None,
        }
    }
}
