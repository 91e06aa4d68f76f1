use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

use crate::{
    runtime_state::PlaybackState,
    services::{
        playlist::{Playlist, PlaylistId},
        profile::{NewProfile, PlaybackProfile, ProfileId, ProfileType, Settings},
    },
};

use super::{PlaybackStateStore, PlaylistRepository, ProfileRepository, StoreError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct LibraryData {
    playback: PlaybackState,
    playlists: BTreeMap<PlaylistId, Playlist>,
    profiles: BTreeMap<ProfileId, PlaybackProfile>,
    assignments: BTreeMap<PlaylistId, ProfileId>,
    next_profile_id: i64,
}

impl LibraryData {
    fn allocate_profile_id(&mut self) -> ProfileId {
        let floor = self.profiles.keys().map(|id| id.0).max().unwrap_or(0);
        self.next_profile_id = self.next_profile_id.max(floor) + 1;
        ProfileId(self.next_profile_id)
    }
}

/// Playlists, profiles, assignments and playback state in one JSON document
///
/// Every write produces a complete new document which is written to a
/// sibling temp file and renamed over the original, so readers never see a
/// half-written library. The CLI and the daemon share the file from separate
/// processes, so every access starts from the document on disk rather than
/// the copy loaded at open. Without a path the library lives only in memory.
pub struct JsonLibrary {
    path: Option<PathBuf>,
    data: Mutex<LibraryData>,
}

fn read_library(path: &Path) -> Result<LibraryData, StoreError> {
    let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

impl JsonLibrary {
    /// Opens the library at `path`, starting empty if the file does not exist.
    ///
    /// # Errors
    /// Returns `StoreError::Io` if the file cannot be read and
    /// `StoreError::Corrupt` if it is not a valid library
    #[instrument]
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let data = if path.exists() {
            let data = read_library(path)?;
            info!(
                playlists = data.playlists.len(),
                profiles = data.profiles.len(),
                "Loaded library"
            );
            data
        } else {
            info!("No library file found, starting empty");
            LibraryData::default()
        };

        Ok(Self {
            path: Some(path.to_path_buf()),
            data: Mutex::new(data),
        })
    }

    /// Library that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: Mutex::new(LibraryData::default()),
        }
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn persist(&self, data: &LibraryData) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| StoreError::Io { path, source }
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }

        let content = serde_json::to_string_pretty(data)?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, content).map_err(io_err(&staging))?;
        fs::rename(&staging, path).map_err(io_err(path))?;

        debug!(path = %path.display(), "Library saved");
        Ok(())
    }

    /// Locks the library after refreshing it from disk.
    ///
    /// A file that has disappeared keeps the last known document.
    async fn current(&self) -> Result<MutexGuard<'_, LibraryData>, StoreError> {
        let mut guard = self.data.lock().await;
        if let Some(path) = self.path.as_deref().filter(|path| path.exists()) {
            *guard = read_library(path)?;
        }
        Ok(guard)
    }

    /// Applies `change` to a fresh copy of the library, persists it, then
    /// commits.
    async fn mutate<T>(
        &self,
        change: impl FnOnce(&mut LibraryData) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.current().await?;
        let mut next = guard.clone();
        let outcome = change(&mut next)?;
        self.persist(&next)?;
        *guard = next;
        Ok(outcome)
    }
}

#[async_trait]
impl PlaybackStateStore for JsonLibrary {
    async fn load_state(&self) -> Result<PlaybackState, StoreError> {
        Ok(self.current().await?.playback.clone())
    }

    async fn save_state(&self, state: PlaybackState) -> Result<(), StoreError> {
        self.mutate(|data| {
            data.playback = state;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl PlaylistRepository for JsonLibrary {
    async fn playlist(&self, id: PlaylistId) -> Result<Option<Playlist>, StoreError> {
        Ok(self.current().await?.playlists.get(&id).cloned())
    }

    async fn playlists(&self) -> Result<Vec<Playlist>, StoreError> {
        Ok(self.current().await?.playlists.values().cloned().collect())
    }

    async fn save_playlist(&self, playlist: Playlist) -> Result<(), StoreError> {
        self.mutate(|data| {
            data.playlists.insert(playlist.id, playlist);
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl ProfileRepository for JsonLibrary {
    async fn profile(&self, id: ProfileId) -> Result<Option<PlaybackProfile>, StoreError> {
        Ok(self.current().await?.profiles.get(&id).cloned())
    }

    async fn profiles(&self) -> Result<Vec<PlaybackProfile>, StoreError> {
        Ok(self.current().await?.profiles.values().cloned().collect())
    }

    async fn create_profile(&self, profile: NewProfile) -> Result<PlaybackProfile, StoreError> {
        self.mutate(|data| {
            let created = PlaybackProfile {
                id: data.allocate_profile_id(),
                name: profile.name,
                profile_type: profile.profile_type,
                settings: profile.settings,
                created_at: Utc::now(),
            };
            data.profiles.insert(created.id, created.clone());
            Ok(created)
        })
        .await
    }

    async fn update_settings(
        &self,
        id: ProfileId,
        settings: Settings,
    ) -> Result<PlaybackProfile, StoreError> {
        self.mutate(|data| {
            let profile = data.profiles.get_mut(&id).ok_or(StoreError::NotFound {
                kind: "Profile",
                id: id.0,
            })?;
            profile.settings = settings;
            Ok(profile.clone())
        })
        .await
    }

    async fn delete_profile(&self, id: ProfileId) -> Result<bool, StoreError> {
        self.mutate(|data| {
            data.assignments.retain(|_, assigned| *assigned != id);
            Ok(data.profiles.remove(&id).is_some())
        })
        .await
    }

    async fn assign(
        &self,
        playlist: PlaylistId,
        profile: ProfileId,
    ) -> Result<Option<ProfileId>, StoreError> {
        self.mutate(|data| {
            if !data.playlists.contains_key(&playlist) {
                return Err(StoreError::NotFound {
                    kind: "Playlist",
                    id: playlist.0,
                });
            }
            if !data.profiles.contains_key(&profile) {
                return Err(StoreError::NotFound {
                    kind: "Profile",
                    id: profile.0,
                });
            }
            Ok(data.assignments.insert(playlist, profile))
        })
        .await
    }

    async fn assigned_profile(
        &self,
        playlist: PlaylistId,
    ) -> Result<Option<PlaybackProfile>, StoreError> {
        let data = self.current().await?;
        Ok(data
            .assignments
            .get(&playlist)
            .and_then(|id| data.profiles.get(id))
            .cloned())
    }

    async fn assignments(&self) -> Result<Vec<(PlaylistId, ProfileId)>, StoreError> {
        Ok(self
            .current()
            .await?
            .assignments
            .iter()
            .map(|(playlist, profile)| (*playlist, *profile))
            .collect())
    }

    async fn current_idle_profile(&self) -> Result<Option<PlaybackProfile>, StoreError> {
        Ok(self
            .current()
            .await?
            .profiles
            .values()
            .filter(|profile| profile.profile_type == ProfileType::Idle)
            .max_by_key(|profile| (profile.created_at, profile.id))
            .cloned())
    }
}
