use std::{path::PathBuf, time::Duration};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which D-Bus bus the service manager lives on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BusKind {
    /// System-wide systemd instance (`systemctl`).
    #[default]
    System,
    /// Per-user systemd instance (`systemctl --user`).
    Session,
}

/// Player process and IPC configuration.
///
/// Durations are expressed in seconds (fractions allowed) so they read
/// naturally in TOML.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PlayerConfig {
    /// Path of the player's JSON IPC socket.
    pub socket_path: PathBuf,

    /// Service manager unit that hosts the player.
    pub service_name: String,

    /// Bus used to reach the service manager.
    pub bus: BusKind,

    /// Maximum send attempts per command.
    pub max_retries: u32,

    /// Delay between send attempts.
    pub retry_delay_secs: f64,

    /// Upper bound for connecting and for waiting on the socket after a restart.
    pub socket_timeout_secs: f64,

    /// Default per-command response timeout.
    pub command_timeout_secs: f64,

    /// Timeout for the handshake probe sent on every new connection.
    pub handshake_timeout_secs: f64,

    /// Timeout for a service manager restart request.
    pub restart_timeout_secs: f64,

    /// Polling interval while waiting for the socket to become connectable.
    pub socket_poll_interval_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from("/tmp/mpvsocket"),
            service_name: "mpv.service".to_string(),
            bus: BusKind::System,
            max_retries: 5,
            retry_delay_secs: 2.0,
            socket_timeout_secs: 10.0,
            command_timeout_secs: 2.0,
            handshake_timeout_secs: 2.0,
            restart_timeout_secs: 10.0,
            socket_poll_interval_ms: 250,
        }
    }
}

impl PlayerConfig {
    /// Delay between send attempts.
    pub fn retry_delay(&self) -> Duration {
        secs(self.retry_delay_secs)
    }

    /// Connect / socket wait timeout.
    pub fn socket_timeout(&self) -> Duration {
        secs(self.socket_timeout_secs)
    }

    /// Default per-command timeout.
    pub fn command_timeout(&self) -> Duration {
        secs(self.command_timeout_secs)
    }

    /// Handshake probe timeout.
    pub fn handshake_timeout(&self) -> Duration {
        secs(self.handshake_timeout_secs)
    }

    /// Restart request timeout.
    pub fn restart_timeout(&self) -> Duration {
        secs(self.restart_timeout_secs)
    }

    /// Socket polling interval.
    pub fn socket_poll_interval(&self) -> Duration {
        Duration::from_millis(self.socket_poll_interval_ms.max(1))
    }
}

/// Longest configurable duration; keeps deadline arithmetic from overflowing.
const LONGEST: Duration = Duration::from_secs(u32::MAX as u64);

/// Converts a configured number of seconds, clamping negatives and NaN to zero
/// and huge or infinite values to [`LONGEST`].
pub(crate) fn secs(value: f64) -> Duration {
    if value.is_nan() || value <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(value).map_or(LONGEST, |duration| duration.min(LONGEST))
}
