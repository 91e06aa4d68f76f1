//! Formatting utilities for CLI output.
//!
//! Keeps status, playlist and profile listings consistent across commands
//! and colors the parts an operator scans for first.

use toml::Value;

use crate::{
    runtime_state::PlaybackStatus,
    services::{
        playback::{PlayerStatus, StartupOutcome},
        playlist::{PlayReport, Playlist},
        profile::{ApplyReport, Category, PlaybackProfile, Settings},
    },
};

/// ANSI color codes for terminal output
pub struct Colors;

impl Colors {
    /// Reset all formatting
    pub const RESET: &'static str = "\x1b[0m";
    /// Bold text
    pub const BOLD: &'static str = "\x1b[1m";
    /// Dim text
    pub const DIM: &'static str = "\x1b[2m";

    /// Red color
    pub const RED: &'static str = "\x1b[31m";
    /// Green color
    pub const GREEN: &'static str = "\x1b[32m";
    /// Yellow color
    pub const YELLOW: &'static str = "\x1b[33m";
    /// Cyan color
    pub const CYAN: &'static str = "\x1b[36m";
}

/// Formats section headers with styling
pub fn format_header(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::CYAN, text, Colors::RESET)
}

/// Formats descriptions with muted styling
pub fn format_description(text: &str) -> String {
    format!("{}{}{}", Colors::DIM, text, Colors::RESET)
}

/// Formats error messages with red styling
pub fn format_error(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::RED, text, Colors::RESET)
}

/// Formats a playback status, green when playing and red on error
pub fn format_status(status: PlaybackStatus) -> String {
    let color = match status {
        PlaybackStatus::Playing => Colors::GREEN,
        PlaybackStatus::Idle => Colors::YELLOW,
        PlaybackStatus::Error => Colors::RED,
    };
    format!("{}{}{}{}", Colors::BOLD, color, status, Colors::RESET)
}

/// Formats settings as `key=value` pairs in key order.
///
/// ```
/// use std::collections::BTreeMap;
/// use vitrine::{cli::formatting::format_settings, services::profile::SettingValue};
///
/// let settings = BTreeMap::from([
///     ("volume".to_string(), SettingValue::Int(40)),
///     ("mute".to_string(), SettingValue::Bool(false)),
/// ]);
/// assert_eq!(format_settings(&settings), "mute=false volume=40");
/// ```
pub fn format_settings(settings: &Settings) -> String {
    if settings.is_empty() {
        return "(no settings)".to_string();
    }

    settings
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Formats a TOML value for human-readable CLI output.
///
/// Arrays and tables show their size rather than their contents.
///
/// ```
/// use vitrine::cli::formatting::format_toml_value;
///
/// let value = toml::Value::String("/run/mpv.sock".to_string());
/// assert_eq!(format_toml_value(&value), "\"/run/mpv.sock\"");
///
/// let value = toml::Value::Integer(5);
/// assert_eq!(format_toml_value(&value), "5");
/// ```
pub fn format_toml_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{s}\""),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Array(arr) => format!("[{}]", arr.len()),
        Value::Table(table) => format!("{{{}}}", table.len()),
        Value::Datetime(dt) => dt.to_string(),
    }
}

/// Multi-line summary of the player status
pub fn format_player_status(status: &PlayerStatus) -> String {
    let playlist = status
        .playback
        .active_playlist_id
        .map_or_else(|| "none".to_string(), |id| id.to_string());
    let profile = status
        .profile_id
        .map_or_else(|| "none".to_string(), |id| id.to_string());

    [
        format!("Status:   {}", format_status(status.playback.status)),
        format!("Playlist: {playlist}"),
        format!("Profile:  {profile}"),
        format!("Channel:  {}", status.channel),
        format_description(&format!(
            "Changed {}",
            status.playback.last_changed_at.to_rfc3339()
        )),
    ]
    .join("\n")
}

/// One line per playlist, with entry count
pub fn format_playlist_line(playlist: &Playlist) -> String {
    let entries = playlist.entries.len();
    let noun = if entries == 1 { "entry" } else { "entries" };
    format!(
        "{:>4}  {}  {}",
        playlist.id.0,
        playlist.name,
        format_description(&format!("{entries} {noun}"))
    )
}

/// Playlist header followed by its entries in play order
pub fn format_playlist_detail(playlist: &Playlist) -> String {
    let mut lines = vec![format_header(&format!("{} ({})", playlist.name, playlist.id))];

    for entry in playlist.ordered_entries() {
        let duration = entry
            .duration_secs
            .map_or_else(String::new, |secs| format!("  {secs}s"));
        lines.push(format!(
            "{:>4}  {}{}",
            entry.position,
            entry.file_reference,
            format_description(&duration)
        ));
    }

    lines.join("\n")
}

/// One line per profile, with any playlists it is assigned to
pub fn format_profile_line(profile: &PlaybackProfile, assigned_to: &[String]) -> String {
    let assignment = if assigned_to.is_empty() {
        String::new()
    } else {
        format!("  -> playlists {}", assigned_to.join(", "))
    };

    format!(
        "{:>4}  {} [{}]  {}{}",
        profile.id.0,
        profile.name,
        profile.profile_type,
        format_settings(&profile.settings),
        format_description(&assignment)
    )
}

fn join_categories(categories: &[Category]) -> String {
    categories
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Which categories applied and which did not
pub fn format_apply_report(report: &ApplyReport) -> String {
    if report.is_complete() {
        format!(
            "Applied profile {} ({})",
            report.profile_id,
            join_categories(&report.applied)
        )
    } else {
        format!(
            "Applied profile {} partially: applied [{}], failed [{}]",
            report.profile_id,
            join_categories(&report.applied),
            format_error(&join_categories(&report.failed))
        )
    }
}

/// Outcome of starting a playlist
pub fn format_play_report(report: &PlayReport) -> String {
    let mut line = format!("Playing playlist {}", report.playlist_id);
    if report.recovered() {
        line.push_str(" (started by loading its first entry directly)");
    }
    line
}

/// Outcome of startup or a player restart
pub fn format_startup_outcome(outcome: StartupOutcome) -> String {
    match outcome {
        StartupOutcome::Resumed(id) => format!("Resumed playlist {id}"),
        StartupOutcome::ResumeFailed(id) => {
            format!("Could not resume playlist {id}; showing the idle logo")
        }
        StartupOutcome::Idle => "Showing the idle logo".to_string(),
    }
}
