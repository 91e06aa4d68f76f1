use std::{io, path::PathBuf, time::Duration};

use crate::services::ipc::ChannelError;

/// Errors raised while putting the idle logo on screen
#[derive(thiserror::Error, Debug)]
pub enum LogoError {
    /// Neither the uploaded logo nor the bundled default is usable
    #[error("No usable logo: {path} is missing or empty")]
    MissingLogo {
        /// Bundled default that was looked for last
        path: PathBuf,
    },

    /// Restoring the logo file failed
    #[error("Failed to restore logo at {path}: {source}")]
    Io {
        /// File being written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// A display command failed
    #[error("Logo command '{command}' failed: {source}")]
    Command {
        /// Command as sent
        command: String,
        /// Channel failure
        #[source]
        source: ChannelError,
    },

    /// A display command did not complete in time
    #[error("Logo command '{command}' did not complete within {timeout:?}")]
    CommandTimeout {
        /// Command as sent
        command: String,
        /// Per-command bound
        timeout: Duration,
    },
}
