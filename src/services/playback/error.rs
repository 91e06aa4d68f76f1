use crate::{
    services::{logo::LogoError, playlist::PlaylistError, profile::ProfileError},
    store::StoreError,
};

/// Errors surfaced by the playback controller
#[derive(thiserror::Error, Debug)]
pub enum PlaybackError {
    /// The player never became ready during startup
    #[error("Player not ready after {attempts} attempt(s): {failures}")]
    InitFailed {
        /// Attempts made
        attempts: u32,
        /// Checks that failed on the last attempt
        failures: String,
    },

    /// Shutdown was requested while the operation was waiting
    #[error("Operation cancelled by shutdown")]
    Cancelled,

    /// Restarting the player service failed
    #[error("Failed to restart player service {unit}")]
    RestartFailed {
        /// Unit restarted
        unit: String,
    },

    /// Starting or stopping a playlist failed
    #[error(transparent)]
    Playlist(#[from] PlaylistError),

    /// Showing the idle logo failed
    #[error(transparent)]
    Logo(#[from] LogoError),

    /// Profile management failed
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// Persisted state could not be read or written
    #[error(transparent)]
    Store(#[from] StoreError),
}
