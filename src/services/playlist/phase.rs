use std::{fmt, path::PathBuf};

use serde::Serialize;

use super::PlaylistId;

/// Steps of bringing a playlist on screen
///
/// The happy path is `Resolving → Neutral → Configuring → Waking → Loading →
/// ListLoaded → Verifying → Playing`. `Waking` is skipped when the player is
/// not idle; `RecoveringDirect` is entered when verification finds no
/// active playlist position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayPhase {
    /// Looking up the playlist and producing its loadable list
    Resolving,
    /// Showing the logo as a neutral state, then stopping it
    Neutral,
    /// Releasing the logo's file loop and applying slideshow options
    Configuring,
    /// Forcing the player out of its idle core with a dummy load
    Waking,
    /// Loading the list in replace mode and pinning per-entry image times
    Loading,
    /// Unpausing and selecting the first entry
    ListLoaded,
    /// Reading back the playlist position
    Verifying,
    /// Loading the first entry directly after a silent list-load failure
    RecoveringDirect,
    /// Playback confirmed
    Playing,
    /// Gave up; the idle logo was requested
    Failed,
}

impl fmt::Display for PlayPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlayPhase::Resolving => "resolving playlist",
            PlayPhase::Neutral => "leaving idle logo",
            PlayPhase::Configuring => "configuring slideshow",
            PlayPhase::Waking => "waking player",
            PlayPhase::Loading => "loading list",
            PlayPhase::ListLoaded => "starting list",
            PlayPhase::Verifying => "verifying playback",
            PlayPhase::RecoveringDirect => "recovering with direct load",
            PlayPhase::Playing => "playing",
            PlayPhase::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// Record of one `play` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayReport {
    /// Playlist started
    pub playlist_id: PlaylistId,
    /// Loadable list handed to the player
    pub list_path: Option<PathBuf>,
    /// Phases entered, in order
    pub transitions: Vec<PlayPhase>,
}

impl PlayReport {
    pub(crate) fn new(playlist_id: PlaylistId) -> Self {
        Self {
            playlist_id,
            list_path: None,
            transitions: Vec::new(),
        }
    }

    pub(crate) fn enter(&mut self, phase: PlayPhase) {
        self.transitions.push(phase);
    }

    /// Phase currently (or last) active
    pub fn phase(&self) -> Option<PlayPhase> {
        self.transitions.last().copied()
    }

    /// Whether the direct single-file recovery ran
    pub fn recovered(&self) -> bool {
        self.transitions.contains(&PlayPhase::RecoveringDirect)
    }

    /// Whether the player was woken from idle
    pub fn woke_player(&self) -> bool {
        self.transitions.contains(&PlayPhase::Waking)
    }
}
