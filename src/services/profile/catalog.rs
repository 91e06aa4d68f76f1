use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::{Category, PropertyType, SettingIssue, Settings};

/// A player property a profile may set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PropertySpec {
    /// Property name as the player knows it
    pub name: &'static str,
    /// Primitive type accepted
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    /// Application group
    pub category: Category,
}

const fn spec(name: &'static str, property_type: PropertyType, category: Category) -> PropertySpec {
    PropertySpec {
        name,
        property_type,
        category,
    }
}

/// Properties profiles are allowed to touch, when the player offers them
pub const CATALOG: &[PropertySpec] = &[
    spec("brightness", PropertyType::Int, Category::Video),
    spec("contrast", PropertyType::Int, Category::Video),
    spec("saturation", PropertyType::Int, Category::Video),
    spec("gamma", PropertyType::Int, Category::Video),
    spec("hue", PropertyType::Int, Category::Video),
    spec("deinterlace", PropertyType::String, Category::Video),
    spec("hwdec", PropertyType::String, Category::Video),
    spec("keepaspect", PropertyType::Bool, Category::Video),
    spec("volume", PropertyType::Int, Category::Audio),
    spec("mute", PropertyType::Bool, Category::Audio),
    spec("audio-channels", PropertyType::String, Category::Audio),
    spec("audio-device", PropertyType::String, Category::Audio),
    spec("fullscreen", PropertyType::Bool, Category::Display),
    spec("video-rotate", PropertyType::Int, Category::Display),
    spec("osd-level", PropertyType::Int, Category::Display),
    spec("border", PropertyType::Bool, Category::Display),
    spec("ontop", PropertyType::Bool, Category::Display),
    spec("screen", PropertyType::Int, Category::Display),
    spec("loop-file", PropertyType::String, Category::Playback),
    spec("loop-playlist", PropertyType::String, Category::Playback),
    spec("image-display-duration", PropertyType::Int, Category::Playback),
    spec("shuffle", PropertyType::Bool, Category::Playback),
    spec("keep-open", PropertyType::String, Category::Playback),
    spec("hr-seek", PropertyType::String, Category::Playback),
];

/// Catalog properties the running player actually offers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupportedProperties {
    specs: BTreeMap<&'static str, PropertySpec>,
}

impl SupportedProperties {
    /// Intersects the catalog with the player's `property-list` reply.
    pub fn from_property_list(list: &Value) -> Self {
        let offered: Vec<&str> = list
            .as_array()
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        Self::from_names(&offered)
    }

    /// Catalog entries named in `offered`.
    pub fn from_names(offered: &[&str]) -> Self {
        let specs = CATALOG
            .iter()
            .filter(|spec| offered.contains(&spec.name))
            .map(|spec| (spec.name, *spec))
            .collect();
        Self { specs }
    }

    /// The whole catalog, regardless of what the player offers.
    pub fn catalog() -> Self {
        Self {
            specs: CATALOG.iter().map(|spec| (spec.name, *spec)).collect(),
        }
    }

    /// Spec for `name`
    pub fn get(&self, name: &str) -> Option<&PropertySpec> {
        self.specs.get(name)
    }

    /// Name to type mapping
    pub fn types(&self) -> BTreeMap<&'static str, PropertyType> {
        self.specs
            .iter()
            .map(|(name, spec)| (*name, spec.property_type))
            .collect()
    }

    /// Supported specs in name order
    pub fn iter(&self) -> impl Iterator<Item = &PropertySpec> {
        self.specs.values()
    }

    /// Number of supported properties
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether nothing is supported
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Every problem with `settings`, empty when they are all acceptable.
    pub fn check(&self, settings: &Settings) -> Vec<SettingIssue> {
        settings
            .iter()
            .filter_map(|(key, value)| match self.specs.get(key.as_str()) {
                None => Some(SettingIssue::Unsupported { key: key.clone() }),
                Some(spec) if spec.property_type != value.property_type() => {
                    Some(SettingIssue::TypeMismatch {
                        key: key.clone(),
                        expected: spec.property_type,
                        found: value.property_type(),
                    })
                }
                Some(_) => None,
            })
            .collect()
    }
}
