use std::{io, path::PathBuf};

use crate::{
    services::{ipc::ChannelError, logo::LogoError},
    store::StoreError,
};

use super::{PlayPhase, PlaylistId};

/// Errors raised while starting or stopping a playlist
#[derive(thiserror::Error, Debug)]
pub enum PlaylistError {
    /// No playlist with this id
    #[error("Playlist {0} not found")]
    NotFound(PlaylistId),

    /// The playlist has no entries
    #[error("Playlist {0} has no entries")]
    Empty(PlaylistId),

    /// Entry positions are not unique and contiguous from zero
    #[error("Playlist {id} has invalid positions: {details}")]
    InvalidPositions {
        /// Playlist checked
        id: PlaylistId,
        /// First offending entry
        details: String,
    },

    /// File type cannot be played
    #[error("Unsupported media type: {reference}")]
    UnsupportedMedia {
        /// Entry file reference
        reference: String,
    },

    /// A referenced media file does not exist
    #[error("Media file not found: {path}")]
    MissingMedia {
        /// Resolved path
        path: PathBuf,
    },

    /// The loadable list could not be read or written
    #[error("Playlist file error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The loaded list has no playable line for direct recovery
    #[error("Loadable list {path} contains no entries")]
    EmptyList {
        /// List file read
        path: PathBuf,
    },

    /// A player command failed during a playback transition
    #[error("Player command failed while {phase}: {source}")]
    Command {
        /// Transition in progress
        phase: PlayPhase,
        /// Channel failure
        #[source]
        source: ChannelError,
    },

    /// Returning to the idle logo failed
    #[error("Idle logo fallback failed: {0}")]
    Fallback(#[from] LogoError),

    /// Reading or writing persisted state failed
    #[error(transparent)]
    Store(#[from] StoreError),
}
