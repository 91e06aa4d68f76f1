use std::path::Path;

use schemars::schema_for;
use toml::Value;

use crate::{
    VitrineError,
    cli::{CommandResult, formatting::format_toml_value, types::CliError},
    config::Config,
};

/// Effective configuration, defaults included.
pub fn show(config: &Config) -> CommandResult {
    Ok(config.to_toml()?)
}

/// Looks up one value by dotted path.
pub fn get(config: &Config, path: &str) -> CommandResult {
    let table: toml::Table =
        toml::from_str(&config.to_toml()?).map_err(|e| VitrineError::toml_parse(e, None))?;
    let root = Value::Table(table);

    let mut current = &root;
    for segment in path.split('.') {
        current = current
            .get(segment)
            .ok_or_else(|| CliError::InvalidArgument {
                arg: "path".to_string(),
                reason: format!("'{path}' not found (missing '{segment}')"),
            })?;
    }

    match current {
        Value::Table(_) => Ok(toml::to_string_pretty(current).map_err(VitrineError::from)?),
        value => Ok(format_toml_value(value)),
    }
}

/// JSON schema for the configuration file.
pub fn schema() -> CommandResult {
    let schema = schema_for!(Config);
    serde_json::to_string_pretty(&schema).map_err(|e| CliError::ServiceError {
        service: "Config",
        details: e.to_string(),
    })
}

/// Location of the configuration file in use.
pub fn path(config_path: &Path) -> CommandResult {
    Ok(config_path.display().to_string())
}
