use std::time::Duration;

/// Errors returned by the player IPC channel
#[derive(thiserror::Error, Debug)]
pub enum ChannelError {
    /// The socket could not be reached even after restarting the player service
    #[error("Player IPC unavailable after {attempts} attempt(s): {reason}")]
    Unavailable {
        /// Attempts made before giving up
        attempts: u32,
        /// Last transport failure observed
        reason: String,
    },

    /// No response arrived within the command timeout
    #[error("Player did not answer '{command}' within {timeout:?} ({attempts} attempt(s))")]
    Timeout {
        /// Command verb
        command: String,
        /// Per-attempt response timeout
        timeout: Duration,
        /// Attempts made before giving up
        attempts: u32,
    },

    /// The player answered with a command-level error
    #[error("Player rejected '{command}': {error}")]
    Protocol {
        /// Command verb
        command: String,
        /// Error string reported by the player
        error: String,
    },

    /// The command could not be serialized
    #[error("Failed to encode command: {0}")]
    Encoding(#[from] serde_json::Error),

    /// A line from the player could not be parsed as a response
    #[error("Malformed response from player: {0}")]
    MalformedResponse(String),

    /// The player closed the socket mid-exchange
    #[error("Player closed the IPC connection")]
    ConnectionClosed,
}

impl ChannelError {
    /// Whether the failure happened below the protocol (socket, framing, timing)
    ///
    /// Transport failures are retried by the channel; protocol and encoding
    /// failures are returned immediately.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ChannelError::Unavailable { .. }
                | ChannelError::Timeout { .. }
                | ChannelError::MalformedResponse(_)
                | ChannelError::ConnectionClosed
        )
    }
}
