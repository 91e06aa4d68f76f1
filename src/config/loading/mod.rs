mod file_creation;

use super::Config;
use crate::{Result, VitrineError};
use file_creation::create_default_config_file;
use std::{fs, path::Path};
use tracing::{debug, info};

impl Config {
    /// Loads the configuration file at `path`
    ///
    /// A default configuration file is written first if none exists, so a
    /// freshly provisioned device always ends up with an editable file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The default file cannot be created
    /// - The configuration file cannot be read
    /// - The TOML content is invalid or does not match the schema
    pub fn load(path: &Path) -> Result<Config> {
        if !path.exists() {
            info!(path = %path.display(), "No configuration file found, writing defaults");
            create_default_config_file(path)?;
        }

        let content = fs::read_to_string(path).map_err(|e| VitrineError::io(e, path))?;
        let config = Self::from_toml(&content).map_err(|e| match e {
            VitrineError::TomlParseError { details, .. } => {
                VitrineError::toml_parse(details, Some(path))
            }
            other => other,
        })?;

        debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Parses a configuration from TOML text
    ///
    /// # Errors
    /// Returns an error if the TOML is malformed or does not match the schema
    pub fn from_toml(content: &str) -> Result<Config> {
        toml::from_str(content).map_err(|e| VitrineError::toml_parse(e, None))
    }

    /// Renders the configuration as TOML
    ///
    /// # Errors
    /// Returns an error if serialization fails
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
