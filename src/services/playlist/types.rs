use std::{fmt, path::Path};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::PlaylistError;

/// Playlist identifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct PlaylistId(pub i64);

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of media an entry refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image shown for a fixed duration
    Image,
    /// Video played for its natural length
    Video,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "webm", "mov", "avi", "m4v", "mpg", "mpeg"];

impl MediaKind {
    /// Detects the media kind from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

/// One item of a playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlaylistEntry {
    /// Media file, absolute or relative to the upload directory
    pub file_reference: String,

    /// Display time for images; ignored for videos
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,

    /// Zero-based position within the playlist
    pub position: u32,
}

impl PlaylistEntry {
    /// Media kind by extension
    pub fn kind(&self) -> Option<MediaKind> {
        MediaKind::from_path(Path::new(&self.file_reference))
    }

    /// Seconds to show this entry: images fall back to `default_image_secs`,
    /// videos have no fixed duration.
    pub fn effective_duration(&self, default_image_secs: u32) -> Option<u32> {
        match self.kind() {
            Some(MediaKind::Image) => Some(self.duration_secs.unwrap_or(default_image_secs)),
            Some(MediaKind::Video) | None => None,
        }
    }
}

/// Ordered media list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Playlist {
    /// Identifier
    pub id: PlaylistId,

    /// Display name
    pub name: String,

    /// Entries, in any order; `position` defines playback order
    #[serde(default)]
    pub entries: Vec<PlaylistEntry>,
}

impl Playlist {
    /// Entries sorted by position.
    pub fn ordered_entries(&self) -> Vec<&PlaylistEntry> {
        let mut entries: Vec<&PlaylistEntry> = self.entries.iter().collect();
        entries.sort_by_key(|entry| entry.position);
        entries
    }

    /// Checks the playlist can be played.
    ///
    /// # Errors
    /// Returns `PlaylistError::Empty` for a playlist without entries,
    /// `PlaylistError::InvalidPositions` unless positions are exactly
    /// `0..len`, and `PlaylistError::UnsupportedMedia` for unknown file types
    pub fn validate(&self) -> Result<(), PlaylistError> {
        if self.entries.is_empty() {
            return Err(PlaylistError::Empty(self.id));
        }

        for (expected, entry) in self.ordered_entries().into_iter().enumerate() {
            if entry.position as usize != expected {
                return Err(PlaylistError::InvalidPositions {
                    id: self.id,
                    details: format!(
                        "expected position {expected}, found {} ({})",
                        entry.position, entry.file_reference
                    ),
                });
            }
            if entry.kind().is_none() {
                return Err(PlaylistError::UnsupportedMedia {
                    reference: entry.file_reference.clone(),
                });
            }
        }

        Ok(())
    }
}
