use std::fmt;

use crate::{services::ipc::ChannelError, store::StoreError};

use super::{ApplyReport, ProfileId, ProfileType, PropertyType};

/// A single rejected setting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingIssue {
    /// The player does not support this property
    Unsupported {
        /// Setting key
        key: String,
    },
    /// The value has the wrong primitive type
    TypeMismatch {
        /// Setting key
        key: String,
        /// Type the player expects
        expected: PropertyType,
        /// Type supplied
        found: PropertyType,
    },
}

impl fmt::Display for SettingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingIssue::Unsupported { key } => write!(f, "'{key}' is not supported"),
            SettingIssue::TypeMismatch {
                key,
                expected,
                found,
            } => write!(f, "'{key}' expects {expected}, got {found}"),
        }
    }
}

fn join_issues(issues: &[SettingIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised by profile management
#[derive(thiserror::Error, Debug)]
pub enum ProfileError {
    /// Settings were rejected; nothing was written or applied
    #[error("Invalid settings: {}", join_issues(.0))]
    InvalidSettings(Vec<SettingIssue>),

    /// No profile with this id
    #[error("Profile {0} not found")]
    NotFound(ProfileId),

    /// The profile cannot be used here
    #[error("Profile {id} is a {found} profile, expected {expected}")]
    WrongType {
        /// Profile checked
        id: ProfileId,
        /// Required type
        expected: ProfileType,
        /// Actual type
        found: ProfileType,
    },

    /// The player's property list could not be read
    #[error("Cannot read supported properties from player: {0}")]
    Schema(#[source] ChannelError),

    /// Some categories failed to apply
    #[error("Profile {} applied partially, failed categories: {:?}", .0.profile_id, .0.failed)]
    PartiallyApplied(ApplyReport),

    /// Persisting the change failed
    #[error(transparent)]
    Store(#[from] StoreError),
}
