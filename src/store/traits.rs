use async_trait::async_trait;

use crate::{
    runtime_state::PlaybackState,
    services::{
        playlist::{Playlist, PlaylistId},
        profile::{NewProfile, PlaybackProfile, ProfileId, Settings},
    },
};

use super::StoreError;

/// Singleton playback state row
#[async_trait]
pub trait PlaybackStateStore: Send + Sync {
    /// Reads the persisted state (idle if never written).
    ///
    /// # Errors
    /// Returns `StoreError` if the backing store fails
    async fn load_state(&self) -> Result<PlaybackState, StoreError>;

    /// Replaces the persisted state.
    ///
    /// # Errors
    /// Returns `StoreError` if the backing store fails
    async fn save_state(&self, state: PlaybackState) -> Result<(), StoreError>;
}

/// Read access to playlists, plus the write the import command needs
#[async_trait]
pub trait PlaylistRepository: Send + Sync {
    /// Playlist by id.
    ///
    /// # Errors
    /// Returns `StoreError` if the backing store fails
    async fn playlist(&self, id: PlaylistId) -> Result<Option<Playlist>, StoreError>;

    /// All playlists ordered by id.
    ///
    /// # Errors
    /// Returns `StoreError` if the backing store fails
    async fn playlists(&self) -> Result<Vec<Playlist>, StoreError>;

    /// Inserts or replaces a playlist.
    ///
    /// # Errors
    /// Returns `StoreError` if the backing store fails
    async fn save_playlist(&self, playlist: Playlist) -> Result<(), StoreError>;
}

/// Profiles and their playlist assignments
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Profile by id.
    ///
    /// # Errors
    /// Returns `StoreError` if the backing store fails
    async fn profile(&self, id: ProfileId) -> Result<Option<PlaybackProfile>, StoreError>;

    /// All profiles ordered by id.
    ///
    /// # Errors
    /// Returns `StoreError` if the backing store fails
    async fn profiles(&self) -> Result<Vec<PlaybackProfile>, StoreError>;

    /// Stores a new profile and returns it with its id.
    ///
    /// # Errors
    /// Returns `StoreError` if the backing store fails
    async fn create_profile(&self, profile: NewProfile) -> Result<PlaybackProfile, StoreError>;

    /// Replaces a profile's settings.
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` for an unknown profile
    async fn update_settings(
        &self,
        id: ProfileId,
        settings: Settings,
    ) -> Result<PlaybackProfile, StoreError>;

    /// Deletes a profile and its assignments; returns whether it existed.
    ///
    /// # Errors
    /// Returns `StoreError` if the backing store fails
    async fn delete_profile(&self, id: ProfileId) -> Result<bool, StoreError>;

    /// Assigns `profile` to `playlist`, replacing any prior assignment.
    /// Returns the replaced profile.
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if either side does not exist
    async fn assign(
        &self,
        playlist: PlaylistId,
        profile: ProfileId,
    ) -> Result<Option<ProfileId>, StoreError>;

    /// Profile assigned to `playlist`.
    ///
    /// # Errors
    /// Returns `StoreError` if the backing store fails
    async fn assigned_profile(
        &self,
        playlist: PlaylistId,
    ) -> Result<Option<PlaybackProfile>, StoreError>;

    /// Every assignment as `(playlist, profile)` pairs.
    ///
    /// # Errors
    /// Returns `StoreError` if the backing store fails
    async fn assignments(&self) -> Result<Vec<(PlaylistId, ProfileId)>, StoreError>;

    /// Most recently created idle profile.
    ///
    /// # Errors
    /// Returns `StoreError` if the backing store fails
    async fn current_idle_profile(&self) -> Result<Option<PlaybackProfile>, StoreError>;
}
