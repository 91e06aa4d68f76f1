//! Configuration schema definitions and validation.
//!
//! Defines the complete configuration structure for Vitrine: logging,
//! player IPC and supervision, media locations, startup sequencing and
//! storage. All configurations are serializable to/from TOML format.

mod general;
mod loading;
mod media;
mod paths;
mod player;
mod startup;
mod storage;

#[cfg(test)]
mod tests;

pub use general::{GeneralConfig, LogLevel};
pub use media::MediaConfig;
pub use paths::ConfigPaths;
pub use player::{BusKind, PlayerConfig};
pub use startup::StartupConfig;
pub use storage::StorageConfig;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Main configuration structure for Vitrine.
///
/// Represents the complete configuration schema that can be loaded
/// from TOML files. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct Config {
    /// General application settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Player process, IPC socket and retry policy.
    #[serde(default)]
    pub player: PlayerConfig,

    /// Media locations: uploads, logo and generated playlists.
    #[serde(default)]
    pub media: MediaConfig,

    /// Startup sequencing and idle-logo retry policy.
    #[serde(default)]
    pub startup: StartupConfig,

    /// Library storage location.
    #[serde(default)]
    pub storage: StorageConfig,
}
