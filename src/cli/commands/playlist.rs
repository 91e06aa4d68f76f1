use std::{fs, path::Path};

use crate::{
    cli::{
        CommandResult,
        formatting::{format_playlist_detail, format_playlist_line},
        types::CliError,
    },
    service_manager::Services,
    services::playlist::{Playlist, PlaylistId},
    store::PlaylistRepository,
};

/// One line per stored playlist.
pub async fn list(services: &Services) -> CommandResult {
    let playlists = services.controller.playlists().await?;

    if playlists.is_empty() {
        return Ok("No playlists stored".to_string());
    }

    Ok(playlists
        .iter()
        .map(format_playlist_line)
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Entries of playlist `id` in play order.
pub async fn show(services: &Services, id: PlaylistId) -> CommandResult {
    let playlist = services
        .library
        .playlist(id)
        .await?
        .ok_or_else(|| CliError::InvalidArgument {
            arg: "playlist".to_string(),
            reason: format!("no playlist with id {id}"),
        })?;

    Ok(format_playlist_detail(&playlist))
}

/// Reads a playlist from JSON, validates it, and stores it.
///
/// An existing playlist with the same id is replaced.
pub async fn import(services: &Services, file: &Path) -> CommandResult {
    let content = fs::read_to_string(file)?;
    let playlist: Playlist =
        serde_json::from_str(&content).map_err(|e| CliError::InvalidArgument {
            arg: "file".to_string(),
            reason: format!("{}: {e}", file.display()),
        })?;

    playlist.validate().map_err(|e| CliError::InvalidArgument {
        arg: "file".to_string(),
        reason: e.to_string(),
    })?;

    let summary = format_playlist_line(&playlist);
    services.library.save_playlist(playlist).await?;

    Ok(format!("Imported:\n{summary}"))
}
