use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::services::profile::{ProfileType, SettingValue, Settings};

/// Digital signage player controller
#[derive(Parser, Debug)]
#[command(name = "vitrine", version, about = "Drive an mpv signage player")]
pub struct Cli {
    /// Configuration file (defaults to $XDG_CONFIG_HOME/vitrine/config.toml)
    #[arg(short, long, global = true, env = "VITRINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the controller: wait for the player, restore the screen, stay up until interrupted
    Serve,

    /// Start a playlist
    Play {
        /// Playlist identifier
        playlist: i64,
    },

    /// Stop playback and show the idle logo
    Stop,

    /// Show playback state and player connection
    Status {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show the idle logo without touching the active playlist
    Logo,

    /// Restart the player service and restore the screen
    RestartPlayer,

    /// Playlist library
    #[command(subcommand)]
    Playlist(PlaylistCommand),

    /// Playback profiles
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Playlist library commands
#[derive(Subcommand, Debug)]
pub enum PlaylistCommand {
    /// List stored playlists
    List,

    /// Show one playlist with its entries
    Show {
        /// Playlist identifier
        playlist: i64,
    },

    /// Add or replace a playlist from a JSON file
    Import {
        /// JSON file holding one playlist
        file: PathBuf,
    },
}

/// Profile kind accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    /// Applied while the idle logo is shown
    Idle,
    /// Applied when an assigned playlist starts
    Playlist,
}

impl From<ProfileKind> for ProfileType {
    fn from(kind: ProfileKind) -> Self {
        match kind {
            ProfileKind::Idle => ProfileType::Idle,
            ProfileKind::Playlist => ProfileType::Playlist,
        }
    }
}

/// Playback profile commands
#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// List stored profiles and their assignments
    List,

    /// Properties the running player accepts in profiles
    Properties,

    /// Create a profile
    Create {
        /// Display name
        name: String,

        /// Where the profile applies
        #[arg(short = 't', long = "type", value_enum)]
        kind: ProfileKind,

        /// Setting as KEY=VALUE; repeat for more
        #[arg(short, long = "set", value_name = "KEY=VALUE", value_parser = parse_setting)]
        settings: Vec<(String, SettingValue)>,
    },

    /// Replace a profile's settings
    Update {
        /// Profile identifier
        profile: i64,

        /// Setting as KEY=VALUE; repeat for more
        #[arg(short, long = "set", value_name = "KEY=VALUE", value_parser = parse_setting)]
        settings: Vec<(String, SettingValue)>,
    },

    /// Delete a profile and its assignments
    Delete {
        /// Profile identifier
        profile: i64,
    },

    /// Assign a playlist profile to a playlist
    Assign {
        /// Playlist identifier
        playlist: i64,
        /// Profile identifier
        profile: i64,
    },

    /// Apply a profile to the player now
    Apply {
        /// Profile identifier
        profile: i64,
    },
}

/// Configuration commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,

    /// Print one value by dotted path, e.g. `player.socket_path`
    Get {
        /// Dotted path into the configuration
        path: String,
    },

    /// Print the configuration JSON schema
    Schema,

    /// Print the configuration file location
    Path,
}

/// Parses `KEY=VALUE` into a typed setting.
pub(crate) fn parse_setting(raw: &str) -> Result<(String, SettingValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;

    let key = key.trim();
    if key.is_empty() {
        return Err("setting key cannot be empty".to_string());
    }

    Ok((key.to_string(), SettingValue::parse_literal(value.trim())))
}

/// Collects parsed settings; later duplicates win.
pub(crate) fn collect_settings(pairs: Vec<(String, SettingValue)>) -> Settings {
    pairs.into_iter().collect()
}
