use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::config::MediaConfig;

use super::LogoError;

const WORLD_READABLE: u32 = 0o644;

/// Locations of the operator logo and the bundled fallback
#[derive(Debug, Clone)]
pub struct LogoFiles {
    logo_path: PathBuf,
    default_logo: PathBuf,
}

impl LogoFiles {
    /// Logo locations from the media configuration.
    pub fn new(media: &MediaConfig) -> Self {
        Self {
            logo_path: media.logo_path(),
            default_logo: media.default_logo.clone(),
        }
    }

    /// Where the operator logo lives
    pub fn logo_path(&self) -> &Path {
        &self.logo_path
    }

    /// Returns a logo file the player can open.
    ///
    /// A missing or empty operator logo is replaced by a copy of the bundled
    /// default. If the copy cannot be written the bundled file is used directly.
    ///
    /// # Errors
    /// Returns `LogoError::MissingLogo` if the bundled default is unusable too
    pub fn resolve(&self) -> Result<PathBuf, LogoError> {
        if is_usable(&self.logo_path) {
            repair_permissions(&self.logo_path);
            return Ok(self.logo_path.clone());
        }

        if !is_usable(&self.default_logo) {
            return Err(LogoError::MissingLogo {
                path: self.default_logo.clone(),
            });
        }

        warn!(
            logo = %self.logo_path.display(),
            default = %self.default_logo.display(),
            "Logo missing or empty, restoring bundled default"
        );

        match self.restore_default() {
            Ok(()) => {
                repair_permissions(&self.logo_path);
                Ok(self.logo_path.clone())
            }
            Err(err) => {
                warn!(error = %err, "Cannot restore logo, showing bundled default in place");
                Ok(self.default_logo.clone())
            }
        }
    }

    fn restore_default(&self) -> Result<(), LogoError> {
        let io_err = |source| LogoError::Io {
            path: self.logo_path.clone(),
            source,
        };

        if let Some(parent) = self.logo_path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::copy(&self.default_logo, &self.logo_path).map_err(io_err)?;
        Ok(())
    }
}

fn is_usable(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|meta| meta.is_file() && meta.len() > 0)
}

/// The player may run as another user, so the logo must be world-readable.
fn repair_permissions(path: &Path) {
    let Ok(meta) = fs::metadata(path) else {
        return;
    };

    let mode = meta.permissions().mode();
    if mode & 0o444 == 0o444 {
        return;
    }

    let repaired = mode | WORLD_READABLE;
    match fs::set_permissions(path, fs::Permissions::from_mode(repaired)) {
        Ok(()) => debug!(path = %path.display(), mode = format!("{repaired:o}"), "Repaired logo permissions"),
        Err(err) => warn!(path = %path.display(), error = %err, "Cannot repair logo permissions"),
    }
}
