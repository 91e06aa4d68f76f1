use std::{collections::BTreeMap, sync::Arc, time::Duration};

use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

use crate::{
    services::{
        events::{EventNotifier, PlaybackEvent},
        ipc::PlayerBackend,
        playlist::PlaylistId,
    },
    store::ProfileRepository,
};

use super::{
    ApplyReport, Category, NewProfile, PlaybackProfile, ProfileError, ProfileId, ProfileType,
    Settings, SupportedProperties,
};

/// Validates, stores and applies playback profiles
///
/// The supported-property set is read from the player once per process and
/// cached; a failed read is not cached.
pub struct ProfileApplier {
    backend: Arc<dyn PlayerBackend>,
    profiles: Arc<dyn ProfileRepository>,
    notifier: Arc<dyn EventNotifier>,
    command_timeout: Duration,
    supported: OnceCell<SupportedProperties>,
}

impl ProfileApplier {
    /// Creates an applier storing profiles in `profiles`.
    pub fn new(
        backend: Arc<dyn PlayerBackend>,
        profiles: Arc<dyn ProfileRepository>,
        notifier: Arc<dyn EventNotifier>,
        command_timeout: Duration,
    ) -> Self {
        Self {
            backend,
            profiles,
            notifier,
            command_timeout,
            supported: OnceCell::new(),
        }
    }

    /// Properties the running player accepts from profiles.
    ///
    /// # Errors
    /// Returns `ProfileError::Schema` if the player's property list cannot be read
    pub async fn supported_properties(&self) -> Result<&SupportedProperties, ProfileError> {
        self.supported
            .get_or_try_init(|| async {
                let list = self
                    .backend
                    .get_property("property-list", self.command_timeout)
                    .await
                    .map_err(ProfileError::Schema)?;
                let supported = SupportedProperties::from_property_list(&list);
                debug!(count = supported.len(), "Cached supported properties");
                Ok(supported)
            })
            .await
    }

    /// Checks `settings` against the supported properties.
    ///
    /// # Errors
    /// Returns `ProfileError::InvalidSettings` listing every rejected key
    pub async fn validate(&self, settings: &Settings) -> Result<(), ProfileError> {
        let issues = self.supported_properties().await?.check(settings);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ProfileError::InvalidSettings(issues))
        }
    }

    /// All stored profiles.
    ///
    /// # Errors
    /// Returns `ProfileError::Store` if the store fails
    pub async fn profiles(&self) -> Result<Vec<PlaybackProfile>, ProfileError> {
        Ok(self.profiles.profiles().await?)
    }

    /// Profile by id.
    ///
    /// # Errors
    /// Returns `ProfileError::NotFound` for an unknown id
    pub async fn profile(&self, id: ProfileId) -> Result<PlaybackProfile, ProfileError> {
        self.profiles
            .profile(id)
            .await?
            .ok_or(ProfileError::NotFound(id))
    }

    /// Validates and stores a new profile.
    ///
    /// # Errors
    /// Returns `ProfileError::InvalidSettings` without storing anything if
    /// any setting is rejected
    #[instrument(skip(self, settings))]
    pub async fn create_profile(
        &self,
        name: &str,
        profile_type: ProfileType,
        settings: Settings,
    ) -> Result<PlaybackProfile, ProfileError> {
        self.validate(&settings).await?;
        let created = self
            .profiles
            .create_profile(NewProfile {
                name: name.to_string(),
                profile_type,
                settings,
            })
            .await?;
        info!(profile = %created.id, "Profile created");
        Ok(created)
    }

    /// Validates and replaces a profile's settings.
    ///
    /// # Errors
    /// Returns `ProfileError::InvalidSettings` without writing if any setting
    /// is rejected, `ProfileError::NotFound` for an unknown id
    #[instrument(skip(self, settings))]
    pub async fn update_profile(
        &self,
        id: ProfileId,
        settings: Settings,
    ) -> Result<PlaybackProfile, ProfileError> {
        self.profile(id).await?;
        self.validate(&settings).await?;
        let updated = self.profiles.update_settings(id, settings).await?;
        info!(profile = %id, "Profile updated");
        Ok(updated)
    }

    /// Deletes a profile and its playlist assignments.
    ///
    /// # Errors
    /// Returns `ProfileError::NotFound` for an unknown id
    #[instrument(skip(self))]
    pub async fn delete_profile(&self, id: ProfileId) -> Result<(), ProfileError> {
        if self.profiles.delete_profile(id).await? {
            info!(profile = %id, "Profile deleted");
            Ok(())
        } else {
            Err(ProfileError::NotFound(id))
        }
    }

    /// Assigns a playlist profile to `playlist`, replacing any earlier one.
    ///
    /// # Errors
    /// Returns `ProfileError::WrongType` for idle profiles and
    /// `ProfileError::NotFound` for an unknown profile
    #[instrument(skip(self))]
    pub async fn assign_profile_to_playlist(
        &self,
        playlist: PlaylistId,
        id: ProfileId,
    ) -> Result<Option<ProfileId>, ProfileError> {
        let profile = self.profile(id).await?;
        if profile.profile_type != ProfileType::Playlist {
            return Err(ProfileError::WrongType {
                id,
                expected: ProfileType::Playlist,
                found: profile.profile_type,
            });
        }

        let replaced = self.profiles.assign(playlist, id).await?;
        info!(replaced = ?replaced, "Profile assigned");
        Ok(replaced)
    }

    /// Pushes a profile's settings to the player, one category at a time.
    ///
    /// Settings are validated first; an invalid profile sends nothing. A
    /// failing category does not stop later ones.
    ///
    /// # Errors
    /// Returns `ProfileError::InvalidSettings` before any command is sent,
    /// or `ProfileError::PartiallyApplied` if any category failed
    #[instrument(skip(self))]
    pub async fn apply_profile(&self, id: ProfileId) -> Result<ApplyReport, ProfileError> {
        let profile = self.profile(id).await?;
        self.validate(&profile.settings).await?;
        let supported = self.supported_properties().await?;

        let mut grouped: BTreeMap<Category, Vec<(&String, serde_json::Value)>> = BTreeMap::new();
        for (key, value) in &profile.settings {
            if let Some(spec) = supported.get(key) {
                grouped
                    .entry(spec.category)
                    .or_default()
                    .push((key, value.to_json()));
            }
        }

        let mut report = ApplyReport {
            profile_id: id,
            applied: Vec::new(),
            failed: Vec::new(),
        };

        for (category, settings) in grouped {
            let mut ok = true;
            for (key, value) in settings {
                if let Err(err) = self
                    .backend
                    .set_property(key, value, self.command_timeout)
                    .await
                {
                    warn!(%category, key = key.as_str(), error = %err, "Setting failed");
                    ok = false;
                }
            }
            if ok {
                report.applied.push(category);
            } else {
                report.failed.push(category);
            }
        }

        info!(applied = ?report.applied, failed = ?report.failed, "Profile applied");
        self.notifier.notify(PlaybackEvent::ProfileApplied {
            profile_id: id,
            categories: report.applied.clone(),
            complete: report.is_complete(),
        });

        if report.is_complete() {
            Ok(report)
        } else {
            Err(ProfileError::PartiallyApplied(report))
        }
    }

    /// Applies the profile assigned to `playlist`, if any.
    ///
    /// # Errors
    /// Same as [`apply_profile`](Self::apply_profile)
    pub async fn apply_for_playlist(
        &self,
        playlist: PlaylistId,
    ) -> Result<Option<ApplyReport>, ProfileError> {
        match self.profiles.assigned_profile(playlist).await? {
            Some(profile) => self.apply_profile(profile.id).await.map(Some),
            None => Ok(None),
        }
    }

    /// Applies the current idle profile, if any.
    ///
    /// # Errors
    /// Same as [`apply_profile`](Self::apply_profile)
    pub async fn apply_idle(&self) -> Result<Option<ApplyReport>, ProfileError> {
        match self.profiles.current_idle_profile().await? {
            Some(profile) => self.apply_profile(profile.id).await.map(Some),
            None => Ok(None),
        }
    }

    /// Profile in effect for the given playback situation.
    ///
    /// # Errors
    /// Returns `ProfileError::Store` if the store fails
    pub async fn profile_in_effect(
        &self,
        playlist: Option<PlaylistId>,
    ) -> Result<Option<PlaybackProfile>, ProfileError> {
        Ok(match playlist {
            Some(id) => self.profiles.assigned_profile(id).await?,
            None => self.profiles.current_idle_profile().await?,
        })
    }
}
