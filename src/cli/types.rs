use thiserror::Error;

use crate::{VitrineError, services::playback::PlaybackError, store::StoreError};

/// Errors that can occur during CLI command execution.
///
/// Each variant carries enough context for the operator to see which part
/// of the system refused the request.
#[derive(Error, Debug)]
pub enum CliError {
    /// An argument was syntactically valid but unusable.
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// Argument name
        arg: String,
        /// Why it was rejected
        reason: String,
    },

    /// The configuration could not be loaded or rendered.
    #[error("Configuration error: {0}")]
    ConfigError(#[from] VitrineError),

    /// A service refused or failed the operation.
    #[error("{service} error: {details}")]
    ServiceError {
        /// Service that failed
        service: &'static str,
        /// Failure details
        details: String,
    },

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<PlaybackError> for CliError {
    fn from(err: PlaybackError) -> Self {
        CliError::ServiceError {
            service: "Playback",
            details: err.to_string(),
        }
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        CliError::ServiceError {
            service: "Library",
            details: err.to_string(),
        }
    }
}

/// Type alias for command execution results.
///
/// Commands return their human-readable output on success.
pub type CommandResult = Result<String, CliError>;
