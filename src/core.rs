use std::{
    fmt, io,
    path::{Path, PathBuf},
    result,
};

use thiserror::Error;

/// Error types for the Vitrine application.
///
/// Covers configuration loading and filesystem setup. Service-level
/// failures have their own error enums under [`crate::services`].
#[derive(Error, Debug)]
pub enum VitrineError {
    /// Configuration validation error
    #[error("configuration validation failed for '{component}': {details}")]
    ConfigValidation {
        /// Component that failed validation
        component: String,
        /// Validation error details
        details: String,
    },

    /// I/O operation error with path context
    #[error("I/O error on '{path}': {details}")]
    IoError {
        /// Path where I/O error occurred
        path: PathBuf,
        /// I/O error details
        details: String,
    },

    /// Standard I/O operation error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// TOML parsing error with location context
    #[error("failed to parse TOML at '{location}': {details}")]
    TomlParseError {
        /// Location of TOML being parsed (file path or "string")
        location: String,
        /// Parse error details
        details: String,
    },

    /// TOML serialization error
    #[error("failed to serialize configuration: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// A specialized `Result` type for Vitrine operations.
pub type Result<T> = result::Result<T, VitrineError>;

impl VitrineError {
    /// Creates a TOML parsing error with optional file path context.
    pub fn toml_parse(error: impl fmt::Display, path: Option<&Path>) -> Self {
        let location = match path {
            Some(p) => {
                let clean_path = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
                clean_path.to_string_lossy().to_string()
            }
            None => "string".to_string(),
        };

        VitrineError::TomlParseError {
            location,
            details: error.to_string(),
        }
    }

    /// Creates an I/O error carrying the path it happened on.
    pub fn io(error: impl fmt::Display, path: &Path) -> Self {
        VitrineError::IoError {
            path: path.to_path_buf(),
            details: error.to_string(),
        }
    }
}
