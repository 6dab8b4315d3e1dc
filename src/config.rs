use std::path::PathBuf;

use crate::errors::JxError;
use crate::lifecycle::directory_name_for_url;
use crate::registry::RegistryStore;

const APP_DIR_NAME: &str = ".jx";
const REGISTRY_FILE_NAME: &str = "config.json";

/// Runtime paths for jx.
///
/// All installed projects live under one application directory, next to the
/// registry file describing them.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_dir: PathBuf,
    pub registry_file: PathBuf,
}

impl Config {
    /// Resolve paths from an explicit home (`--home` / `JX_HOME`), falling
    /// back to `~/.jx`.
    pub fn new(home: Option<PathBuf>) -> Result<Self, JxError> {
        let app_dir = match home {
            Some(dir) => dir,
            None => dirs::home_dir()
                .ok_or(JxError::HomeDirUnavailable)?
                .join(APP_DIR_NAME),
        };
        Ok(Self::with_app_dir(app_dir))
    }

    /// Paths rooted at `app_dir`, made absolute so recorded paths survive a
    /// change of working directory.
    pub fn with_app_dir(app_dir: impl Into<PathBuf>) -> Self {
        let app_dir = app_dir.into();
        let app_dir = std::path::absolute(&app_dir).unwrap_or(app_dir);
        let registry_file = app_dir.join(REGISTRY_FILE_NAME);
        Self {
            app_dir,
            registry_file,
        }
    }

    pub fn registry_store(&self) -> RegistryStore {
        RegistryStore::new(&self.registry_file)
    }

    /// Working copy location for a repository URL, or `None` when the URL has
    /// no usable last segment.
    pub fn project_dir_for_url(&self, url: &str) -> Option<PathBuf> {
        directory_name_for_url(url).map(|name| self.app_dir.join(name))
    }
}
