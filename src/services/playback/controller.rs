use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use tokio::{
    sync::{Mutex, MutexGuard},
    task::JoinHandle,
    time::{sleep, timeout},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    config::StartupConfig,
    runtime_state::PlaybackState,
    services::{
        events::{EventNotifier, PlaybackEvent},
        logo::LogoController,
        playlist::{PlayReport, Playlist, PlaylistId, PlaylistPlayer},
        profile::{
            ApplyReport, PlaybackProfile, ProfileApplier, ProfileId, ProfileType, Settings,
        },
    },
    store::{PlaybackStateStore, PlaylistRepository},
};

use super::{PlaybackError, PlayerLifecycle, PlayerStatus, StartupOutcome};

/// Collaborators wired into the controller
pub struct ControllerDeps {
    /// Player process checks and restart
    pub lifecycle: Arc<dyn PlayerLifecycle>,
    /// Playlist state machine
    pub player: PlaylistPlayer,
    /// Idle logo display
    pub logo: Arc<LogoController>,
    /// Profile management
    pub profiles: Arc<ProfileApplier>,
    /// Playlist lookup
    pub playlists: Arc<dyn PlaylistRepository>,
    /// Playback state row
    pub state: Arc<dyn PlaybackStateStore>,
    /// Event publisher
    pub notifier: Arc<dyn EventNotifier>,
}

/// Entry point for everything that changes what the screen shows
///
/// Every operation that drives the player holds one operation lock, so two
/// concurrent `play` calls never interleave their command sequences. Each
/// such operation also bumps a generation counter; the background idle-logo
/// task gives up as soon as it sees a newer generation.
pub struct PlaybackController {
    lifecycle: Arc<dyn PlayerLifecycle>,
    player: PlaylistPlayer,
    logo: Arc<LogoController>,
    profiles: Arc<ProfileApplier>,
    playlists: Arc<dyn PlaylistRepository>,
    state: Arc<dyn PlaybackStateStore>,
    notifier: Arc<dyn EventNotifier>,
    startup: StartupConfig,
    operation: Mutex<()>,
    generation: AtomicU64,
    shutdown: CancellationToken,
    background: Mutex<Option<JoinHandle<()>>>,
}

impl PlaybackController {
    /// Creates a controller; call [`initialize`](Self::initialize) before use.
    pub fn new(deps: ControllerDeps, startup: StartupConfig) -> Self {
        Self {
            lifecycle: deps.lifecycle,
            player: deps.player,
            logo: deps.logo,
            profiles: deps.profiles,
            playlists: deps.playlists,
            state: deps.state,
            notifier: deps.notifier,
            startup,
            operation: Mutex::new(()),
            generation: AtomicU64::new(0),
            shutdown: CancellationToken::new(),
            background: Mutex::new(None),
        }
    }

    /// Token cancelled by [`shutdown`](Self::shutdown).
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Waits for the player to become ready, then restores the screen.
    ///
    /// A persisted playing state resumes its playlist; otherwise the idle
    /// logo is established in the background with retries.
    ///
    /// # Errors
    /// Returns `PlaybackError::InitFailed` if the player is not ready after
    /// every attempt, `PlaybackError::Cancelled` on shutdown
    #[instrument(skip(self))]
    pub async fn initialize(self: &Arc<Self>) -> Result<StartupOutcome, PlaybackError> {
        self.wait_until_ready().await?;

        let persisted = self.state.load_state().await?;
        let Some(id) = persisted.resumable_playlist() else {
            info!(status = %persisted.status, "Nothing to resume, showing idle logo");
            self.spawn_idle_logo().await;
            return Ok(StartupOutcome::Idle);
        };

        info!(playlist = %id, "Resuming persisted playlist");
        match self.play(id).await {
            Ok(_) => Ok(StartupOutcome::Resumed(id)),
            Err(err) => {
                warn!(playlist = %id, error = %err, "Resume failed, showing idle logo");
                self.spawn_idle_logo().await;
                Ok(StartupOutcome::ResumeFailed(id))
            }
        }
    }

    /// Starts playlist `id` and applies its assigned profile.
    ///
    /// # Errors
    /// Returns `PlaybackError::Playlist` if the playlist could not be started;
    /// the idle logo has been requested by then
    pub async fn play(&self, id: PlaylistId) -> Result<PlayReport, PlaybackError> {
        let _operation = self.begin().await;
        let report = self.player.play(id).await?;
        self.apply_best_effort(Some(id)).await;
        Ok(report)
    }

    /// Stops playback, shows the idle logo and applies the idle profile.
    ///
    /// # Errors
    /// Returns `PlaybackError::Playlist` if the logo or idle state failed
    pub async fn stop(&self) -> Result<(), PlaybackError> {
        let _operation = self.begin().await;
        self.player.stop().await?;
        self.apply_best_effort(None).await;
        Ok(())
    }

    /// Shows the idle logo and records the idle state.
    ///
    /// # Errors
    /// Returns `PlaybackError::Logo` if the logo could not be displayed
    pub async fn display_idle_logo(&self) -> Result<PathBuf, PlaybackError> {
        let _operation = self.begin().await;
        self.state.save_state(PlaybackState::idle()).await?;
        self.show_logo().await
    }

    /// Current playback state, channel state and profile in effect.
    ///
    /// # Errors
    /// Returns `PlaybackError::Store` if the state cannot be read
    pub async fn status(&self) -> Result<PlayerStatus, PlaybackError> {
        let playback = self.state.load_state().await?;
        let profile_id = self
            .profiles
            .profile_in_effect(playback.resumable_playlist())
            .await?
            .map(|profile| profile.id);

        Ok(PlayerStatus {
            playback,
            channel: self.lifecycle.channel_state(),
            profile_id,
        })
    }

    /// Restarts the player service and restores what was on screen.
    ///
    /// # Errors
    /// Returns `PlaybackError::RestartFailed` if the service did not come
    /// back, or the error of restoring playback
    #[instrument(skip(self))]
    pub async fn restart_player(&self) -> Result<StartupOutcome, PlaybackError> {
        let _operation = self.begin().await;

        if !self.lifecycle.restart().await {
            error!("Player restart failed");
            return Err(PlaybackError::RestartFailed {
                unit: self.lifecycle.unit(),
            });
        }

        match self.state.load_state().await?.resumable_playlist() {
            Some(id) => {
                self.player.play(id).await?;
                self.apply_best_effort(Some(id)).await;
                Ok(StartupOutcome::Resumed(id))
            }
            None => {
                self.show_logo().await?;
                Ok(StartupOutcome::Idle)
            }
        }
    }

    /// Validates and stores new settings, re-applying them if the profile
    /// is currently in effect.
    ///
    /// # Errors
    /// Returns `PlaybackError::Profile` if validation or storage fails
    pub async fn update_settings(
        &self,
        id: ProfileId,
        settings: Settings,
    ) -> Result<PlaybackProfile, PlaybackError> {
        let _operation = self.begin().await;
        let updated = self.profiles.update_profile(id, settings).await?;

        let playing = self.state.load_state().await?.resumable_playlist();
        let in_effect = self.profiles.profile_in_effect(playing).await?;
        if in_effect.is_some_and(|profile| profile.id == id) {
            if let Err(err) = self.profiles.apply_profile(id).await {
                warn!(profile = %id, error = %err, "Updated profile not fully re-applied");
            }
        }

        Ok(updated)
    }

    /// Applies profile `id` now.
    ///
    /// # Errors
    /// Returns `PlaybackError::Profile` if validation fails or any category failed
    pub async fn apply_profile(&self, id: ProfileId) -> Result<ApplyReport, PlaybackError> {
        let _operation = self.begin().await;
        Ok(self.profiles.apply_profile(id).await?)
    }

    /// Validates and stores a new profile.
    ///
    /// # Errors
    /// Returns `PlaybackError::Profile` if the settings are rejected
    pub async fn create_profile(
        &self,
        name: &str,
        profile_type: ProfileType,
        settings: Settings,
    ) -> Result<PlaybackProfile, PlaybackError> {
        Ok(self
            .profiles
            .create_profile(name, profile_type, settings)
            .await?)
    }

    /// Deletes a profile and its assignments.
    ///
    /// # Errors
    /// Returns `PlaybackError::Profile` for an unknown profile
    pub async fn delete_profile(&self, id: ProfileId) -> Result<(), PlaybackError> {
        Ok(self.profiles.delete_profile(id).await?)
    }

    /// Assigns a playlist profile, replacing any earlier assignment.
    ///
    /// # Errors
    /// Returns `PlaybackError::Profile` for unknown or idle profiles
    pub async fn assign_profile(
        &self,
        playlist: PlaylistId,
        profile: ProfileId,
    ) -> Result<Option<ProfileId>, PlaybackError> {
        Ok(self
            .profiles
            .assign_profile_to_playlist(playlist, profile)
            .await?)
    }

    /// All stored profiles.
    ///
    /// # Errors
    /// Returns `PlaybackError::Profile` if the store fails
    pub async fn profiles(&self) -> Result<Vec<PlaybackProfile>, PlaybackError> {
        Ok(self.profiles.profiles().await?)
    }

    /// All stored playlists.
    ///
    /// # Errors
    /// Returns `PlaybackError::Store` if the store fails
    pub async fn playlists(&self) -> Result<Vec<Playlist>, PlaybackError> {
        Ok(self.playlists.playlists().await?)
    }

    /// Cancels background work and waits for it to finish.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        if let Some(handle) = self.background.lock().await.take() {
            handle.abort();
            let _ = handle.await;
        }
        info!("Playback controller stopped");
    }

    async fn begin(&self) -> MutexGuard<'_, ()> {
        let guard = self.operation.lock().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        guard
    }

    async fn wait_until_ready(&self) -> Result<(), PlaybackError> {
        let attempts = self.startup.init_attempts.max(1);
        let mut attempt = 1;

        loop {
            let failures = self.readiness_failures().await;
            if failures.is_empty() {
                info!(attempt, "Player ready");
                return Ok(());
            }

            if attempt >= attempts {
                error!(attempts, failures = ?failures, "Player never became ready");
                return Err(PlaybackError::InitFailed {
                    attempts,
                    failures: failures.join(", "),
                });
            }

            let backoff = self.startup.init_backoff(attempt);
            warn!(attempt, max_attempts = attempts, failures = ?failures, backoff_ms = backoff.as_millis() as u64, "Player not ready, retrying");
            tokio::select! {
                () = self.shutdown.cancelled() => return Err(PlaybackError::Cancelled),
                () = sleep(backoff) => {}
            }
            attempt += 1;
        }
    }

    async fn readiness_failures(&self) -> Vec<String> {
        let bound = self.startup.init_check_timeout();
        let (active, reachable, handshake) = tokio::join!(
            timeout(bound, self.lifecycle.service_active()),
            timeout(bound, self.lifecycle.socket_reachable()),
            timeout(bound, self.lifecycle.handshake()),
        );

        let timed_out = |check: &str| format!("{check} timed out after {bound:?}");
        let mut failures = Vec::new();
        match active {
            Ok(true) => {}
            Ok(false) => failures.push("service inactive".to_string()),
            Err(_) => failures.push(timed_out("service check")),
        }
        match reachable {
            Ok(true) => {}
            Ok(false) => failures.push("socket unreachable".to_string()),
            Err(_) => failures.push(timed_out("socket check")),
        }
        match handshake {
            Ok(Ok(())) => {}
            Ok(Err(err)) => failures.push(format!("handshake failed: {err}")),
            Err(_) => failures.push(timed_out("handshake")),
        }
        failures
    }

    async fn spawn_idle_logo(self: &Arc<Self>) {
        let this = Arc::clone(self);
        let generation = self.generation.load(Ordering::SeqCst);
        let handle = tokio::spawn(async move { this.establish_idle_logo(generation).await });

        if let Some(previous) = self.background.lock().await.replace(handle) {
            previous.abort();
        }
    }

    async fn establish_idle_logo(&self, generation: u64) {
        let attempts = self.startup.logo_attempts.max(1);

        for attempt in 1..=attempts {
            if self.shutdown.is_cancelled() {
                return;
            }

            let outcome = {
                let _operation = self.operation.lock().await;
                if self.generation.load(Ordering::SeqCst) != generation {
                    debug!("Idle logo superseded by a newer operation");
                    return;
                }
                self.show_logo().await
            };

            match outcome {
                Ok(_) => return,
                Err(err) => {
                    warn!(attempt, max_attempts = attempts, error = %err, "Idle logo attempt failed");
                }
            }

            if attempt < attempts {
                tokio::select! {
                    () = self.shutdown.cancelled() => return,
                    () = sleep(self.startup.logo_retry_delay()) => {}
                }
            }
        }

        error!(attempts, "CRITICAL: idle logo could not be displayed, screen state is undefined");
    }

    /// Caller must hold the operation lock.
    async fn show_logo(&self) -> Result<PathBuf, PlaybackError> {
        let logo = self.logo.display_idle_logo().await?;
        self.notifier
            .notify(PlaybackEvent::IdleLogoDisplayed { logo: logo.clone() });
        self.apply_best_effort(None).await;
        Ok(logo)
    }

    async fn apply_best_effort(&self, playlist: Option<PlaylistId>) {
        let outcome = match playlist {
            Some(id) => self.profiles.apply_for_playlist(id).await,
            None => self.profiles.apply_idle().await,
        };

        match outcome {
            Ok(Some(report)) => debug!(profile = %report.profile_id, "Profile in effect applied"),
            Ok(None) => {}
            Err(err) => warn!(error = %err, "Profile in effect not fully applied"),
        }
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
