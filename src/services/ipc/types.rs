use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::PlayerConfig;

use super::ChannelError;

/// Response `error` value meaning the command succeeded.
pub const SUCCESS: &str = "success";

/// A single command for the player
///
/// Serialized as one JSON line: `{"command": [verb, args...], "request_id": n}`.
/// The request id is stamped by the channel right before sending.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerCommand {
    verb: String,
    args: Vec<Value>,
    request_id: u64,
}

impl PlayerCommand {
    /// Creates a command from a verb and its positional arguments.
    pub fn new(verb: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            verb: verb.into(),
            args,
            request_id: 0,
        }
    }

    /// `loadfile <path> <mode>`
    pub fn loadfile(path: impl fmt::Display, mode: &str) -> Self {
        Self::new("loadfile", vec![json!(path.to_string()), json!(mode)])
    }

    /// `loadfile <path> insert-at <index> <options>`, with per-file options
    /// as `key=value[,key=value]`
    pub fn loadfile_at(path: impl fmt::Display, index: usize, options: &str) -> Self {
        Self::new(
            "loadfile",
            vec![
                json!(path.to_string()),
                json!("insert-at"),
                json!(index),
                json!(options),
            ],
        )
    }

    /// `playlist-remove <index>`
    pub fn playlist_remove(index: usize) -> Self {
        Self::new("playlist-remove", vec![json!(index)])
    }

    /// `loadlist <path> <mode>`
    pub fn loadlist(path: impl fmt::Display, mode: &str) -> Self {
        Self::new("loadlist", vec![json!(path.to_string()), json!(mode)])
    }

    /// `stop`
    pub fn stop() -> Self {
        Self::new("stop", Vec::new())
    }

    /// `get_property <name>`
    pub fn get_property(name: &str) -> Self {
        Self::new("get_property", vec![json!(name)])
    }

    /// `set_property <name> <value>`
    pub fn set_property(name: &str, value: Value) -> Self {
        Self::new("set_property", vec![json!(name), value])
    }

    /// `playlist-play-index <index>`
    pub fn playlist_play_index(index: i64) -> Self {
        Self::new("playlist-play-index", vec![json!(index)])
    }

    /// `load-script <path>`
    pub fn load_script(path: impl fmt::Display) -> Self {
        Self::new("load-script", vec![json!(path.to_string())])
    }

    /// `get_version`, used as the handshake probe
    pub fn get_version() -> Self {
        Self::new("get_version", Vec::new())
    }

    /// Command verb
    pub fn verb(&self) -> &str {
        &self.verb
    }

    /// Positional arguments
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Correlation id sent with the command
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    /// Returns the command stamped with `request_id`.
    pub fn with_request_id(mut self, request_id: u64) -> Self {
        self.request_id = request_id;
        self
    }

    /// Serializes the command as a newline-terminated JSON line.
    ///
    /// # Errors
    /// Returns `ChannelError::Encoding` if an argument cannot be serialized
    pub fn to_line(&self) -> Result<String, ChannelError> {
        let mut command = Vec::with_capacity(self.args.len() + 1);
        command.push(Value::String(self.verb.clone()));
        command.extend(self.args.iter().cloned());

        let mut line = serde_json::to_string(&json!({
            "command": command,
            "request_id": self.request_id,
        }))?;
        line.push('\n');
        Ok(line)
    }
}

impl fmt::Display for PlayerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.verb)?;
        for arg in &self.args {
            match arg {
                Value::String(s) => write!(f, " {s}")?,
                other => write!(f, " {other}")?,
            }
        }
        Ok(())
    }
}

/// A response line from the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerResponse {
    /// `"success"` or an error description
    pub error: String,

    /// Command result, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Echo of the request's correlation id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<u64>,
}

impl PlayerResponse {
    /// Successful response carrying `data`.
    pub fn success(data: Option<Value>) -> Self {
        Self {
            error: SUCCESS.to_string(),
            data,
            request_id: None,
        }
    }

    /// Whether the player reported success.
    pub fn is_success(&self) -> bool {
        self.error == SUCCESS
    }

    /// Converts a command-level failure into `ChannelError::Protocol`.
    ///
    /// # Errors
    /// Returns `ChannelError::Protocol` when `error` is not `"success"`
    pub fn into_result(self, command: &str) -> Result<Option<Value>, ChannelError> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(ChannelError::Protocol {
                command: command.to_string(),
                error: self.error,
            })
        }
    }
}

/// Connection state of the IPC channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChannelState {
    /// No connection; the next command will connect
    #[default]
    Disconnected,
    /// Connecting and probing the player
    Connecting,
    /// Connected and answering
    Ready,
    /// A command failed at the transport level; the next one reconnects
    Degraded,
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelState::Disconnected => write!(f, "disconnected"),
            ChannelState::Connecting => write!(f, "connecting"),
            ChannelState::Ready => write!(f, "ready"),
            ChannelState::Degraded => write!(f, "degraded"),
        }
    }
}

/// Retry and timeout policy for the channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Maximum attempts per command
    pub max_attempts: u32,
    /// Delay between attempts
    pub retry_delay: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Handshake probe timeout
    pub handshake_timeout: Duration,
}

impl RetryPolicy {
    /// Policy from the `[player]` config section.
    pub fn from_config(config: &PlayerConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            retry_delay: config.retry_delay(),
            connect_timeout: config.socket_timeout(),
            handshake_timeout: config.handshake_timeout(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_delay: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(10),
            handshake_timeout: Duration::from_secs(2),
        }
    }
}

/// A response together with how it was obtained
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// The player's response
    pub response: PlayerResponse,
    /// Attempt on which the command succeeded (1-based)
    pub attempts: u32,
    /// Time spent including lock wait and retries
    pub elapsed: Duration,
}
