use std::sync::Arc;

use tracing::debug;

use crate::{
    config::Config,
    services::{
        events::{BroadcastNotifier, EventNotifier},
        ipc::{Connector, IpcChannel, PlayerBackend, RetryPolicy, UnixSocketConnector},
        logo::LogoController,
        playback::{ControllerDeps, PlaybackController, SupervisedPlayer},
        playlist::{M3uFormatter, PlaybackTimings, PlayerDeps, PlaylistPlayer},
        profile::ProfileApplier,
        supervisor::{ProcessSupervisor, ServiceManager, SystemdServiceManager},
    },
    store::{JsonLibrary, StoreError},
};

/// Container for the wired player control services
///
/// Everything is built once from the configuration and shared through
/// `Arc`s. Only [`PlaybackController`] should be used to change what the
/// screen shows; the other handles are exposed for inspection and for
/// library maintenance that does not touch the player.
pub struct Services {
    /// Process supervision for the player service
    pub supervisor: Arc<ProcessSupervisor>,
    /// IPC channel to the player
    pub channel: Arc<IpcChannel>,
    /// Playlists, profiles and the playback state row
    pub library: Arc<JsonLibrary>,
    /// Playback event publisher
    pub notifier: BroadcastNotifier,
    /// Idle logo display
    pub logo: Arc<LogoController>,
    /// Profile management and application
    pub profiles: Arc<ProfileApplier>,
    /// Facade for every screen-changing operation
    pub controller: Arc<PlaybackController>,
}

impl Services {
    /// Create all services for the player described by `config`
    ///
    /// Talks to systemd on the configured bus and to the player over its
    /// Unix socket. Nothing connects until the first operation needs it.
    ///
    /// # Errors
    /// Returns error if the library file exists but cannot be read
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        let library = Arc::new(JsonLibrary::open(&config.storage.library_file)?);
        let manager = Arc::new(SystemdServiceManager::new(config.player.bus));
        let connector = Arc::new(UnixSocketConnector::new(&config.player.socket_path));

        Ok(Self::with_parts(config, manager, connector, library))
    }

    /// Wire services over explicit collaborators
    pub fn with_parts(
        config: &Config,
        manager: Arc<dyn ServiceManager>,
        connector: Arc<dyn Connector>,
        library: Arc<JsonLibrary>,
    ) -> Self {
        let player_config = &config.player;
        let command_timeout = player_config.command_timeout();

        let supervisor = Arc::new(ProcessSupervisor::new(manager, player_config));
        let channel = Arc::new(IpcChannel::new(
            connector,
            supervisor.clone(),
            RetryPolicy::from_config(player_config),
        ));
        let backend: Arc<dyn PlayerBackend> = channel.clone();

        let notifier = BroadcastNotifier::default();
        let events: Arc<dyn EventNotifier> = Arc::new(notifier.clone());

        let logo = Arc::new(LogoController::new(backend.clone(), &config.media));
        let profiles = Arc::new(ProfileApplier::new(
            backend.clone(),
            library.clone(),
            events.clone(),
            command_timeout,
        ));

        let player = PlaylistPlayer::new(
            PlayerDeps {
                backend,
                playlists: library.clone(),
                state: library.clone(),
                formatter: Arc::new(M3uFormatter::new(&config.media)),
                fallback: logo.clone(),
                notifier: events.clone(),
            },
            PlaybackTimings::new(&config.media, command_timeout),
        );

        let lifecycle = Arc::new(SupervisedPlayer::new(
            supervisor.clone(),
            channel.clone(),
            player_config.socket_timeout(),
        ));

        let controller = Arc::new(PlaybackController::new(
            ControllerDeps {
                lifecycle,
                player,
                logo: logo.clone(),
                profiles: profiles.clone(),
                playlists: library.clone(),
                state: library.clone(),
                notifier: events,
            },
            config.startup.clone(),
        ));

        debug!(
            unit = %supervisor.unit(),
            socket = %supervisor.socket_path().display(),
            "Player services wired"
        );

        Self {
            supervisor,
            channel,
            library,
            notifier,
            logo,
            profiles,
            controller,
        }
    }
}
