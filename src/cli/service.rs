use std::path::{Path, PathBuf};

use crate::{
    config::{Config, ConfigPaths},
    service_manager::Services,
    services::{playlist::PlaylistId, profile::ProfileId},
};

use super::{
    CliError, CommandResult,
    args::{Commands, ConfigCommand, PlaylistCommand, ProfileCommand},
    commands::{config, playback, playlist, profile, serve},
};

/// Executes parsed commands against the configured player.
///
/// Holds the loaded configuration; player services are built per command
/// so configuration commands work on machines without a player.
pub struct CliService {
    config: Config,
    config_path: PathBuf,
}

impl CliService {
    /// Loads the configuration from `path`, or the default location.
    ///
    /// # Errors
    /// Returns error if no config location can be determined or the file is invalid
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => ConfigPaths::main_config()?,
        };
        let config = Config::load(&config_path)?;

        Ok(Self::with_config(config, config_path))
    }

    /// Uses an already loaded configuration.
    pub fn with_config(config: Config, config_path: PathBuf) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Configuration in effect.
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn services(&self) -> Result<Services, CliError> {
        Ok(Services::new(&self.config)?)
    }

    /// Runs `command` and returns its output.
    ///
    /// # Errors
    /// Returns `CliError` describing which service refused the command
    pub async fn execute(&self, command: Commands) -> CommandResult {
        match command {
            Commands::Serve => serve::run(&self.config).await,
            Commands::Play { playlist } => {
                playback::play(&self.services()?, PlaylistId(playlist)).await
            }
            Commands::Stop => playback::stop(&self.services()?).await,
            Commands::Status { json } => playback::status(&self.services()?, json).await,
            Commands::Logo => playback::logo(&self.services()?).await,
            Commands::RestartPlayer => playback::restart_player(&self.services()?).await,
            Commands::Playlist(command) => self.playlist(command).await,
            Commands::Profile(command) => self.profile(command).await,
            Commands::Config(command) => self.config_command(command),
        }
    }

    async fn playlist(&self, command: PlaylistCommand) -> CommandResult {
        let services = self.services()?;
        match command {
            PlaylistCommand::List => playlist::list(&services).await,
            PlaylistCommand::Show { playlist } => {
                playlist::show(&services, PlaylistId(playlist)).await
            }
            PlaylistCommand::Import { file } => playlist::import(&services, &file).await,
        }
    }

    async fn profile(&self, command: ProfileCommand) -> CommandResult {
        let services = self.services()?;
        match command {
            ProfileCommand::List => profile::list(&services).await,
            ProfileCommand::Properties => profile::properties(&services).await,
            ProfileCommand::Create {
                name,
                kind,
                settings,
            } => profile::create(&services, &name, kind.into(), settings).await,
            ProfileCommand::Update { profile, settings } => {
                profile::update(&services, ProfileId(profile), settings).await
            }
            ProfileCommand::Delete { profile } => {
                profile::delete(&services, ProfileId(profile)).await
            }
            ProfileCommand::Assign { playlist, profile } => {
                profile::assign(&services, PlaylistId(playlist), ProfileId(profile)).await
            }
            ProfileCommand::Apply { profile } => {
                profile::apply(&services, ProfileId(profile)).await
            }
        }
    }

    fn config_command(&self, command: ConfigCommand) -> CommandResult {
        match command {
            ConfigCommand::Show => config::show(&self.config),
            ConfigCommand::Get { path } => config::get(&self.config, &path),
            ConfigCommand::Schema => config::schema(),
            ConfigCommand::Path => config::path(&self.config_path),
        }
    }
}
