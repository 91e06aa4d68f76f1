use std::path::PathBuf;

use serde::Serialize;

use crate::services::{
    playlist::PlaylistId,
    profile::{Category, ProfileId},
};

/// Playback change published to subscribers
///
/// Serializes as `{"event": "<name>", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// A playlist is on screen
    PlaybackStarted {
        /// Playlist now playing
        playlist_id: PlaylistId,
        /// Whether the direct single-file recovery was needed
        recovered: bool,
    },

    /// Playback was stopped and the idle logo requested
    PlaybackStopped,

    /// Starting a playlist failed and the screen fell back to the logo
    PlaybackFailed {
        /// Playlist that failed, if it was resolved
        playlist_id: Option<PlaylistId>,
        /// Human-readable cause
        reason: String,
    },

    /// The idle logo is on screen
    IdleLogoDisplayed {
        /// File shown
        logo: PathBuf,
    },

    /// A profile's settings were pushed to the player
    ProfileApplied {
        /// Profile applied
        profile_id: ProfileId,
        /// Categories that applied cleanly
        categories: Vec<Category>,
        /// Whether every category succeeded
        complete: bool,
    },
}

impl PlaybackEvent {
    /// Event name as published on the wire
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackEvent::PlaybackStarted { .. } => "playback_started",
            PlaybackEvent::PlaybackStopped => "playback_stopped",
            PlaybackEvent::PlaybackFailed { .. } => "playback_failed",
            PlaybackEvent::IdleLogoDisplayed { .. } => "idle_logo_displayed",
            PlaybackEvent::ProfileApplied { .. } => "profile_applied",
        }
    }
}

/// Fire-and-forget publisher of playback events
///
/// Implementations must not block; nobody waits for subscribers.
pub trait EventNotifier: Send + Sync {
    /// Publishes `event`.
    fn notify(&self, event: PlaybackEvent);
}

/// Notifier that drops every event
pub struct NullNotifier;

impl EventNotifier for NullNotifier {
    fn notify(&self, _event: PlaybackEvent) {}
}
