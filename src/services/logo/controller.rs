use std::{path::PathBuf, sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::json;
use tokio::time::timeout;
use tracing::{info, instrument, warn};

use crate::{
    config::MediaConfig,
    services::ipc::{PlayerBackend, PlayerCommand},
};

use super::{LogoError, LogoFiles};

/// Something that can put the screen into its safe idle state
///
/// Playback components fall back through this after any failure so a
/// broken playlist never leaves the screen blank.
#[async_trait]
pub trait FallbackNotifier: Send + Sync {
    /// Shows the idle logo.
    ///
    /// # Errors
    /// Returns the first display failure
    async fn fall_back_to_idle(&self) -> Result<(), LogoError>;
}

/// Shows the operator logo full screen, looping, unpaused
pub struct LogoController {
    backend: Arc<dyn PlayerBackend>,
    files: LogoFiles,
    command_timeout: Duration,
}

impl LogoController {
    /// Creates a controller driving `backend` with logo paths from `media`.
    pub fn new(backend: Arc<dyn PlayerBackend>, media: &MediaConfig) -> Self {
        Self {
            backend,
            files: LogoFiles::new(media),
            command_timeout: media.logo_command_timeout(),
        }
    }

    /// Logo file locations
    pub fn files(&self) -> &LogoFiles {
        &self.files
    }

    /// Displays the idle logo and returns the file shown.
    ///
    /// The load, loop and unpause commands are dispatched together; each is
    /// bounded by its own timeout and the channel lock keeps them in order.
    ///
    /// # Errors
    /// Returns `LogoError` if no logo file is usable or any command fails
    #[instrument(skip(self))]
    pub async fn display_idle_logo(&self) -> Result<PathBuf, LogoError> {
        let path = self.files.resolve()?;

        let commands = [
            PlayerCommand::loadfile(path.display(), "replace"),
            PlayerCommand::set_property("loop-file", json!("inf")),
            PlayerCommand::set_property("pause", json!(false)),
        ];

        let bound = self.command_timeout;
        let dispatched = commands.into_iter().map(|command| {
            let backend = Arc::clone(&self.backend);
            let label = command.to_string();
            async move {
                let outcome = timeout(bound, backend.execute(command, bound)).await;
                (label, outcome)
            }
        });

        let mut failure = None;
        for (command, outcome) in join_all(dispatched).await {
            let error = match outcome {
                Ok(Ok(_)) => continue,
                Ok(Err(source)) => LogoError::Command { command, source },
                Err(_) => LogoError::CommandTimeout {
                    command,
                    timeout: bound,
                },
            };
            warn!(error = %error, "Idle logo command failed");
            failure.get_or_insert(error);
        }

        match failure {
            Some(error) => Err(error),
            None => {
                info!(logo = %path.display(), "Idle logo displayed");
                Ok(path)
            }
        }
    }
}

#[async_trait]
impl FallbackNotifier for LogoController {
    async fn fall_back_to_idle(&self) -> Result<(), LogoError> {
        self.display_idle_logo().await.map(|_| ())
    }
}
