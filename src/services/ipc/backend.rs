use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{ChannelError, IpcChannel, PlayerCommand, PlayerResponse};

/// Capability to drive the player, shared by every component that needs it
///
/// Components receive an `Arc<dyn PlayerBackend>` instead of reaching for a
/// global channel, which keeps them testable with an in-process double.
#[async_trait]
pub trait PlayerBackend: Send + Sync {
    /// Sends `command` and returns the raw response.
    ///
    /// # Errors
    /// Returns a transport-level `ChannelError` if the player cannot be reached
    async fn send_command(
        &self,
        command: PlayerCommand,
        timeout: Duration,
    ) -> Result<PlayerResponse, ChannelError>;

    /// Sends `command` and fails on a command-level error.
    ///
    /// # Errors
    /// Returns `ChannelError::Protocol` if the player rejected the command,
    /// or the transport error from [`send_command`](Self::send_command)
    async fn execute(
        &self,
        command: PlayerCommand,
        timeout: Duration,
    ) -> Result<Option<Value>, ChannelError> {
        let verb = command.verb().to_string();
        self.send_command(command, timeout)
            .await?
            .into_result(&verb)
    }

    /// Reads a player property (`Value::Null` when the player returns no data).
    ///
    /// # Errors
    /// Same as [`execute`](Self::execute)
    async fn get_property(&self, name: &str, timeout: Duration) -> Result<Value, ChannelError> {
        Ok(self
            .execute(PlayerCommand::get_property(name), timeout)
            .await?
            .unwrap_or(Value::Null))
    }

    /// Writes a player property.
    ///
    /// # Errors
    /// Same as [`execute`](Self::execute)
    async fn set_property(
        &self,
        name: &str,
        value: Value,
        timeout: Duration,
    ) -> Result<(), ChannelError> {
        self.execute(PlayerCommand::set_property(name, value), timeout)
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl PlayerBackend for IpcChannel {
    async fn send_command(
        &self,
        command: PlayerCommand,
        timeout: Duration,
    ) -> Result<PlayerResponse, ChannelError> {
        self.send(command, timeout).await
    }
}
