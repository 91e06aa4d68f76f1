use serde::Serialize;

use crate::{
    runtime_state::PlaybackState,
    services::{ipc::ChannelState, playlist::PlaylistId, profile::ProfileId},
};

/// Snapshot returned by the status query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStatus {
    /// Persisted playback state
    #[serde(flatten)]
    pub playback: PlaybackState,

    /// IPC channel state
    pub channel: ChannelState,

    /// Profile in effect for the current state, if any
    pub profile_id: Option<ProfileId>,
}

/// How startup left the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "playlist_id", rename_all = "snake_case")]
pub enum StartupOutcome {
    /// The persisted playlist was resumed
    Resumed(PlaylistId),
    /// Resuming failed; the idle logo is being established
    ResumeFailed(PlaylistId),
    /// Nothing to resume; the idle logo is being established
    Idle,
}
