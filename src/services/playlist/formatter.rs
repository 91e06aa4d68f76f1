use std::{
    fs,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::config::MediaConfig;

use super::{Playlist, PlaylistError};

/// Turns a playlist into a file the player can load
#[async_trait]
pub trait PlaylistFormatter: Send + Sync {
    /// Returns the absolute path of a loadable list for `playlist`.
    ///
    /// Must be idempotent: formatting an unchanged playlist again yields the
    /// same path and leaves the file untouched.
    ///
    /// # Errors
    /// Returns `PlaylistError` if the playlist is invalid, references missing
    /// media, or the list cannot be written
    async fn ensure_loadable(&self, playlist: &Playlist) -> Result<PathBuf, PlaylistError>;
}

/// Writes extended M3U lists into the playlist directory
pub struct M3uFormatter {
    media_root: PathBuf,
    output_dir: PathBuf,
    default_image_secs: u32,
}

impl M3uFormatter {
    /// Formatter resolving media against the upload directory.
    pub fn new(media: &MediaConfig) -> Self {
        Self {
            media_root: media.upload_dir.clone(),
            output_dir: media.playlist_dir.clone(),
            default_image_secs: media.default_image_duration_secs,
        }
    }

    /// Path the list for `playlist` is written to
    pub fn list_path(&self, playlist: &Playlist) -> PathBuf {
        self.output_dir.join(format!("playlist-{}.m3u", playlist.id))
    }

    fn resolve_media(&self, reference: &str) -> PathBuf {
        let joined = self.media_root.join(reference);
        std::path::absolute(&joined).unwrap_or(joined)
    }

    /// Renders the list contents.
    ///
    /// # Errors
    /// Returns `PlaylistError` if validation fails or a media file is missing
    pub fn render(&self, playlist: &Playlist) -> Result<String, PlaylistError> {
        playlist.validate()?;

        let mut out = String::from("#EXTM3U\n");
        for entry in playlist.ordered_entries() {
            let path = self.resolve_media(&entry.file_reference);
            if !path.is_file() {
                return Err(PlaylistError::MissingMedia { path });
            }

            let duration = entry
                .effective_duration(self.default_image_secs)
                .map_or(-1, i64::from);
            let title = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| entry.file_reference.clone());

            out.push_str(&format!("#EXTINF:{duration},{title}\n{}\n", path.display()));
        }
        Ok(out)
    }
}

#[async_trait]
impl PlaylistFormatter for M3uFormatter {
    #[instrument(skip(self, playlist), fields(playlist = %playlist.id))]
    async fn ensure_loadable(&self, playlist: &Playlist) -> Result<PathBuf, PlaylistError> {
        let contents = self.render(playlist)?;
        let list_path = self.list_path(playlist);
        let path = std::path::absolute(&list_path).unwrap_or(list_path);
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| PlaylistError::Io { path, source }
        };

        if fs::read_to_string(&path).is_ok_and(|existing| existing == contents) {
            debug!(list = %path.display(), "Loadable list up to date");
            return Ok(path);
        }

        fs::create_dir_all(&self.output_dir).map_err(io_err(&self.output_dir))?;
        let staging = path.with_extension("m3u.tmp");
        fs::write(&staging, contents).map_err(io_err(&staging))?;
        fs::rename(&staging, &path).map_err(io_err(&path))?;

        debug!(list = %path.display(), "Wrote loadable list");
        Ok(path)
    }
}

/// First playable line of a loadable list.
pub(crate) fn first_entry(list: &str) -> Option<&str> {
    list.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Playable line of a loadable list with the display time from its `#EXTINF`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ListItem<'a> {
    /// Zero-based index in the player's playlist
    pub index: usize,
    /// Absolute media path
    pub path: &'a str,
    /// `None` for videos and untimed entries
    pub duration_secs: Option<u32>,
}

/// Playable lines of a loadable list, in order.
pub(crate) fn list_items(list: &str) -> Vec<ListItem<'_>> {
    let mut items = Vec::new();
    let mut duration_secs = None;

    for line in list.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(info) = line.strip_prefix("#EXTINF:") {
            let secs = info.split_once(',').map_or(info, |(secs, _)| secs);
            duration_secs = secs.trim().parse::<u32>().ok();
        } else if !line.starts_with('#') {
            items.push(ListItem {
                index: items.len(),
                path: line,
                duration_secs: duration_secs.take(),
            });
        }
    }

    items
}
