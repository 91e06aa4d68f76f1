use crate::{Result, VitrineError, config::Config};
use std::{fs, path::Path};

const HEADER: &str = "# Vitrine configuration file\n\
# Every key is optional; removed keys fall back to their defaults.\n\n";

/// Creates a default configuration file if it doesn't exist
pub fn create_default_config_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| VitrineError::io(e, parent))?;
    }

    let body = Config::default().to_toml()?;
    fs::write(path, format!("{HEADER}{body}")).map_err(|e| VitrineError::io(e, path))?;

    Ok(())
}
