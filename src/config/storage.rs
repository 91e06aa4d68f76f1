use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Library storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding playlists, profiles, assignments and playback state.
    pub library_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            library_file: PathBuf::from("/var/lib/vitrine/library.json"),
        }
    }
}
