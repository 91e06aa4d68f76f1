use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Profile identifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct ProfileId(pub i64);

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a profile applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProfileType {
    /// While the idle logo is shown
    Idle,
    /// While an assigned playlist plays
    Playlist,
}

impl fmt::Display for ProfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileType::Idle => write!(f, "idle"),
            ProfileType::Playlist => write!(f, "playlist"),
        }
    }
}

/// Primitive type of a player property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    /// `true`/`false`
    Bool,
    /// Signed integer
    Int,
    /// Free-form string (also used for choices such as `"inf"`)
    String,
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyType::Bool => write!(f, "bool"),
            PropertyType::Int => write!(f, "int"),
            PropertyType::String => write!(f, "string"),
        }
    }
}

/// Group a setting is applied with
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Scaling, color, deinterlacing
    Video,
    /// Volume, mute, channels
    Audio,
    /// Fullscreen, OSD, rotation
    Display,
    /// Looping, image duration, speed
    Playback,
}

impl Category {
    /// Every category in application order
    pub const ALL: [Category; 4] = [
        Category::Video,
        Category::Audio,
        Category::Display,
        Category::Playback,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Video => write!(f, "video"),
            Category::Audio => write!(f, "audio"),
            Category::Display => write!(f, "display"),
            Category::Playback => write!(f, "playback"),
        }
    }
}

/// Value of a single profile setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum SettingValue {
    /// Boolean flag
    Bool(bool),
    /// Integer value
    Int(i64),
    /// String value
    String(String),
}

impl SettingValue {
    /// Primitive type carried by this value
    pub fn property_type(&self) -> PropertyType {
        match self {
            SettingValue::Bool(_) => PropertyType::Bool,
            SettingValue::Int(_) => PropertyType::Int,
            SettingValue::String(_) => PropertyType::String,
        }
    }

    /// JSON form sent to the player
    pub fn to_json(&self) -> Value {
        match self {
            SettingValue::Bool(b) => Value::Bool(*b),
            SettingValue::Int(i) => Value::from(*i),
            SettingValue::String(s) => Value::String(s.clone()),
        }
    }

    /// Parses a command-line literal: `true`/`false`, an integer, else a string.
    pub fn parse_literal(raw: &str) -> Self {
        match raw {
            "true" => SettingValue::Bool(true),
            "false" => SettingValue::Bool(false),
            _ => raw
                .parse::<i64>()
                .map(SettingValue::Int)
                .unwrap_or_else(|_| SettingValue::String(raw.to_string())),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(b) => write!(f, "{b}"),
            SettingValue::Int(i) => write!(f, "{i}"),
            SettingValue::String(s) => write!(f, "{s}"),
        }
    }
}

/// Setting key to value, ordered by key
pub type Settings = BTreeMap<String, SettingValue>;

/// A named, reusable set of player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlaybackProfile {
    /// Identifier
    pub id: ProfileId,

    /// Display name
    pub name: String,

    /// Idle or playlist profile
    #[serde(rename = "type")]
    pub profile_type: ProfileType,

    /// Player settings
    #[serde(default)]
    pub settings: Settings,

    /// Creation time; the newest idle profile is the current one
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProfile {
    /// Display name
    pub name: String,
    /// Idle or playlist profile
    pub profile_type: ProfileType,
    /// Player settings
    pub settings: Settings,
}

/// Outcome of applying a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// Profile applied
    pub profile_id: ProfileId,
    /// Categories whose settings all applied
    pub applied: Vec<Category>,
    /// Categories with at least one failed setting
    pub failed: Vec<Category>,
}

impl ApplyReport {
    /// Whether every category applied
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
