use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use serde_json::{Value, json};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    config::MediaConfig,
    runtime_state::PlaybackState,
    services::{
        events::{EventNotifier, PlaybackEvent},
        ipc::{ChannelError, PlayerBackend, PlayerCommand},
        logo::FallbackNotifier,
    },
    store::{PlaybackStateStore, PlaylistRepository},
};

use super::{
    PlayPhase, PlayReport, PlaylistError, PlaylistFormatter, PlaylistId,
    formatter::{first_entry, list_items},
};

/// File loaded to wake an idle player core
const WAKE_FILE: &str = "/dev/null";

/// Timing and rendering options for playlist playback
#[derive(Debug, Clone)]
pub struct PlaybackTimings {
    /// Bound for ordinary commands
    pub command_timeout: Duration,
    /// Bound for the list load
    pub load_timeout: Duration,
    /// Pause after the neutral logo before stopping it
    pub settle_delay: Duration,
    /// Display time for images without an explicit duration
    pub image_duration_secs: u32,
    /// Slideshow script to load before playlists
    pub slideshow_script: Option<PathBuf>,
}

impl PlaybackTimings {
    /// Options from the media config with `command_timeout` for short commands.
    pub fn new(media: &MediaConfig, command_timeout: Duration) -> Self {
        Self {
            command_timeout,
            load_timeout: media.load_timeout(),
            settle_delay: media.settle_delay(),
            image_duration_secs: media.default_image_duration_secs,
            slideshow_script: media.slideshow_script.clone(),
        }
    }
}

/// Collaborators the playlist player drives
pub struct PlayerDeps {
    /// Player command capability
    pub backend: Arc<dyn PlayerBackend>,
    /// Playlist lookup
    pub playlists: Arc<dyn PlaylistRepository>,
    /// Playback state row
    pub state: Arc<dyn PlaybackStateStore>,
    /// Loadable list producer
    pub formatter: Arc<dyn PlaylistFormatter>,
    /// Idle logo fallback
    pub fallback: Arc<dyn FallbackNotifier>,
    /// Event publisher
    pub notifier: Arc<dyn EventNotifier>,
}

/// Brings playlists on screen and takes them off again
pub struct PlaylistPlayer {
    backend: Arc<dyn PlayerBackend>,
    playlists: Arc<dyn PlaylistRepository>,
    state: Arc<dyn PlaybackStateStore>,
    formatter: Arc<dyn PlaylistFormatter>,
    fallback: Arc<dyn FallbackNotifier>,
    notifier: Arc<dyn EventNotifier>,
    timings: PlaybackTimings,
}

impl PlaylistPlayer {
    /// Creates a player over `deps`.
    pub fn new(deps: PlayerDeps, timings: PlaybackTimings) -> Self {
        Self {
            backend: deps.backend,
            playlists: deps.playlists,
            state: deps.state,
            formatter: deps.formatter,
            fallback: deps.fallback,
            notifier: deps.notifier,
            timings,
        }
    }

    /// Starts playlist `id` looping from its first entry.
    ///
    /// On any failure the state is recorded as `error`, the idle logo is
    /// requested and the failure is returned.
    ///
    /// # Errors
    /// Returns the `PlaylistError` of the step that failed
    #[instrument(skip(self), fields(playlist = %id))]
    pub async fn play(&self, id: PlaylistId) -> Result<PlayReport, PlaylistError> {
        let mut report = PlayReport::new(id);

        match self.drive(&mut report).await {
            Ok(()) => {
                report.enter(PlayPhase::Playing);
                // The playing row was written before the transition; this only refreshes it.
                if let Err(err) = self.state.save_state(PlaybackState::playing(id)).await {
                    error!(error = %err, "Failed to refresh playing state");
                }
                info!(
                    recovered = report.recovered(),
                    woke = report.woke_player(),
                    "Playlist playing"
                );
                self.notifier.notify(PlaybackEvent::PlaybackStarted {
                    playlist_id: id,
                    recovered: report.recovered(),
                });
                Ok(report)
            }
            Err(err) => {
                let failed_in = report.phase();
                report.enter(PlayPhase::Failed);
                error!(phase = ?failed_in, error = %err, "Playlist start failed, falling back to idle logo");
                self.fail(Some(id), &err).await;
                Err(err)
            }
        }
    }

    /// Returns the screen to the idle logo.
    ///
    /// Stopping the player is best-effort and never prevents the logo.
    ///
    /// # Errors
    /// Returns `PlaylistError::Store` if the idle state cannot be recorded
    /// and `PlaylistError::Fallback` if the logo cannot be displayed
    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<(), PlaylistError> {
        let saved = self.state.save_state(PlaybackState::idle()).await;
        if let Err(err) = &saved {
            error!(error = %err, "Failed to record idle state");
        }

        if let Err(err) = self
            .backend
            .execute(PlayerCommand::stop(), self.timings.command_timeout)
            .await
        {
            warn!(error = %err, "Player stop failed, showing idle logo anyway");
        }

        self.fallback.fall_back_to_idle().await?;
        self.notifier.notify(PlaybackEvent::PlaybackStopped);
        info!("Playback stopped");

        saved.map_err(PlaylistError::from)
    }

    async fn drive(&self, report: &mut PlayReport) -> Result<(), PlaylistError> {
        let id = report.playlist_id;

        report.enter(PlayPhase::Resolving);
        let playlist = self
            .playlists
            .playlist(id)
            .await?
            .ok_or(PlaylistError::NotFound(id))?;
        let list = self.formatter.ensure_loadable(&playlist).await?;
        report.list_path = Some(list.clone());

        self.state.save_state(PlaybackState::playing(id)).await?;

        report.enter(PlayPhase::Neutral);
        if let Err(err) = self.fallback.fall_back_to_idle().await {
            warn!(error = %err, "Neutral logo failed, continuing");
        }
        sleep(self.timings.settle_delay).await;
        self.run(PlayPhase::Neutral, PlayerCommand::stop()).await?;

        report.enter(PlayPhase::Configuring);
        self.configure_slideshow().await?;

        if self.core_idle().await {
            report.enter(PlayPhase::Waking);
            self.best_effort(PlayerCommand::loadfile(WAKE_FILE, "replace"))
                .await;
        }

        report.enter(PlayPhase::Loading);
        self.backend
            .execute(
                PlayerCommand::loadlist(list.display(), "replace"),
                self.timings.load_timeout,
            )
            .await
            .map_err(|source| PlaylistError::Command {
                phase: PlayPhase::Loading,
                source,
            })?;
        self.pin_entry_durations(&list).await?;

        report.enter(PlayPhase::ListLoaded);
        self.unpause(PlayPhase::ListLoaded).await?;
        self.run(PlayPhase::ListLoaded, PlayerCommand::playlist_play_index(0))
            .await?;
        self.unpause(PlayPhase::ListLoaded).await?;

        report.enter(PlayPhase::Verifying);
        if !self.list_engaged().await? {
            report.enter(PlayPhase::RecoveringDirect);
            self.recover_direct(&list).await?;
        }

        Ok(())
    }

    async fn fail(&self, id: Option<PlaylistId>, err: &PlaylistError) {
        if let Err(store_err) = self.state.save_state(PlaybackState::error(id)).await {
            error!(error = %store_err, "Failed to record error state");
        }
        if let Err(logo_err) = self.fallback.fall_back_to_idle().await {
            error!(error = %logo_err, "Idle logo fallback failed");
        }
        self.notifier.notify(PlaybackEvent::PlaybackFailed {
            playlist_id: id,
            reason: err.to_string(),
        });
    }

    /// Releases the idle logo's global `loop-file`, then applies the optional
    /// slideshow options.
    async fn configure_slideshow(&self) -> Result<(), PlaylistError> {
        self.run(
            PlayPhase::Configuring,
            PlayerCommand::set_property("loop-file", json!("no")),
        )
        .await?;

        if let Some(script) = &self.timings.slideshow_script {
            self.best_effort(PlayerCommand::load_script(script.display()))
                .await;
        }
        self.best_effort(PlayerCommand::set_property("loop-playlist", json!("inf")))
            .await;
        self.best_effort(PlayerCommand::set_property(
            "image-display-duration",
            json!(self.timings.image_duration_secs),
        ))
        .await;
        Ok(())
    }

    /// Re-inserts entries whose display time differs from the global
    /// `image-display-duration` with that time as a per-file option.
    async fn pin_entry_durations(&self, list: &Path) -> Result<(), PlaylistError> {
        let contents = read_list(list)?;
        let phase = PlayPhase::Loading;

        for item in list_items(&contents) {
            let Some(secs) = item
                .duration_secs
                .filter(|secs| *secs != self.timings.image_duration_secs)
            else {
                continue;
            };

            debug!(index = item.index, secs, "Pinning entry display time");
            let options = format!("image-display-duration={secs}");
            self.run(phase, PlayerCommand::loadfile_at(item.path, item.index, &options))
                .await?;
            self.run(phase, PlayerCommand::playlist_remove(item.index + 1))
                .await?;
        }

        Ok(())
    }

    /// Unreadable idle state counts as idle; a spurious wake load is harmless.
    async fn core_idle(&self) -> bool {
        match self
            .backend
            .get_property("core-idle", self.timings.command_timeout)
            .await
        {
            Ok(Value::Bool(idle)) => idle,
            Ok(other) => {
                debug!(value = %other, "Unexpected core-idle value");
                false
            }
            Err(err) => {
                warn!(error = %err, "Cannot read core-idle, waking player");
                true
            }
        }
    }

    async fn list_engaged(&self) -> Result<bool, PlaylistError> {
        let position = self
            .backend
            .get_property("playlist-pos", self.timings.command_timeout)
            .await
            .map_err(|source| PlaylistError::Command {
                phase: PlayPhase::Verifying,
                source,
            })?;

        match position.as_i64() {
            Some(pos) if pos >= 0 => Ok(true),
            _ => {
                warn!(playlist_pos = %position, "List loaded but no entry is active");
                Ok(false)
            }
        }
    }

    async fn recover_direct(&self, list: &Path) -> Result<(), PlaylistError> {
        let contents = read_list(list)?;
        let first = first_entry(&contents).ok_or_else(|| PlaylistError::EmptyList {
            path: list.to_path_buf(),
        })?;

        info!(file = first, "Loading first entry directly");
        let phase = PlayPhase::RecoveringDirect;
        self.run(phase, PlayerCommand::stop()).await?;
        self.run(phase, PlayerCommand::loadfile(first, "replace"))
            .await?;
        self.unpause(phase).await
    }

    async fn unpause(&self, phase: PlayPhase) -> Result<(), PlaylistError> {
        self.run(phase, PlayerCommand::set_property("pause", json!(false)))
            .await
    }

    async fn run(&self, phase: PlayPhase, command: PlayerCommand) -> Result<(), PlaylistError> {
        self.backend
            .execute(command, self.timings.command_timeout)
            .await
            .map(|_| ())
            .map_err(|source| PlaylistError::Command { phase, source })
    }

    async fn best_effort(&self, command: PlayerCommand) {
        let label = command.to_string();
        if let Err(err) = self
            .backend
            .execute(command, self.timings.command_timeout)
            .await
        {
            log_best_effort(&label, &err);
        }
    }
}

fn read_list(list: &Path) -> Result<String, PlaylistError> {
    fs::read_to_string(list).map_err(|source| PlaylistError::Io {
        path: list.to_path_buf(),
        source,
    })
}

fn log_best_effort(command: &str, err: &ChannelError) {
    warn!(command, error = %err, "Optional player command failed, continuing");
}
