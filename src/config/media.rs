use std::{path::PathBuf, time::Duration};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::player::secs;

/// Media locations and playback timing.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MediaConfig {
    /// Root directory holding uploaded media and the custom logo.
    pub upload_dir: PathBuf,

    /// File name of the idle logo inside `upload_dir`.
    pub logo_filename: String,

    /// Bundled image copied into place when the custom logo is missing.
    pub default_logo: PathBuf,

    /// Directory where loadable playlist files are written.
    pub playlist_dir: PathBuf,

    /// Optional player script loaded before a playlist starts.
    pub slideshow_script: Option<PathBuf>,

    /// Display time for images without an explicit duration.
    pub default_image_duration_secs: u32,

    /// Per-command timeout while establishing the idle logo.
    pub logo_command_timeout_secs: f64,

    /// Timeout for loading a playlist into the player.
    pub load_timeout_secs: f64,

    /// Pause after switching to the neutral logo before loading a playlist.
    pub settle_delay_ms: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("/var/lib/vitrine/uploads"),
            logo_filename: "logo.png".to_string(),
            default_logo: PathBuf::from("/usr/share/vitrine/default-logo.png"),
            playlist_dir: PathBuf::from("/var/lib/vitrine/playlists"),
            slideshow_script: None,
            default_image_duration_secs: 5,
            logo_command_timeout_secs: 5.0,
            load_timeout_secs: 10.0,
            settle_delay_ms: 500,
        }
    }
}

impl MediaConfig {
    /// Full path of the configured idle logo.
    pub fn logo_path(&self) -> PathBuf {
        self.upload_dir.join(&self.logo_filename)
    }

    /// Per-command timeout for the idle logo.
    pub fn logo_command_timeout(&self) -> Duration {
        secs(self.logo_command_timeout_secs)
    }

    /// Playlist load timeout.
    pub fn load_timeout(&self) -> Duration {
        secs(self.load_timeout_secs)
    }

    /// Settle delay after the neutral logo.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
