//! Host framework configuration
//!
//! Resolves where the framework keeps its extensions and whether cached
//! extension modules must be reloaded.
//!
//! # Environment Variables
//!
//! - `EXTMAN_HOME`: framework home directory (default `~/.extman`)
//! - `EXTMAN_RELOAD_EXTENSIONS`: evict cached extension modules before every
//!   load when set to `1`, `true`, `yes` or `on`

use crate::error::Result;
use crate::utils::{get_home_dir, is_truthy};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the framework home
pub const HOME_ENV: &str = "EXTMAN_HOME";

/// Environment variable enabling forced module reloads
pub const RELOAD_ENV: &str = "EXTMAN_RELOAD_EXTENSIONS";

/// Home directory name under the user's home
pub const DEFAULT_HOME_DIR: &str = ".extman";

/// Manifest file name inside the framework home
pub const MANIFEST_FILE_NAME: &str = "extensions.yaml";

/// Directory holding installed packages inside the framework home
pub const DEFAULT_PACKAGES_DIR: &str = "node_modules";

/// Resolved host configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Framework home directory
    pub home: PathBuf,

    /// Extension manifest file
    pub manifest_path: PathBuf,

    /// Package directory name used to build require paths
    pub packages_dir: String,

    /// Evict cached modules before loading them
    pub force_reload: bool,
}

impl HostConfig {
    /// Configuration rooted at `home` with default settings
    pub fn new(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            manifest_path: home.join(MANIFEST_FILE_NAME),
            home,
            packages_dir: DEFAULT_PACKAGES_DIR.to_string(),
            force_reload: false,
        }
    }

    /// Resolve configuration from the environment
    pub fn from_env() -> Result<Self> {
        let home = match std::env::var(HOME_ENV) {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => get_home_dir()?.join(DEFAULT_HOME_DIR),
        };

        let force_reload = std::env::var(RELOAD_ENV)
            .map(|v| is_truthy(&v))
            .unwrap_or(false);

        debug!(
            "Host config: home={:?}, force_reload={}",
            home, force_reload
        );

        Ok(Self::new(home).with_force_reload(force_reload))
    }

    pub fn with_force_reload(mut self, force_reload: bool) -> Self {
        self.force_reload = force_reload;
        self
    }

    pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }

    pub fn with_packages_dir(mut self, dir: impl Into<String>) -> Self {
        self.packages_dir = dir.into();
        self
    }

    pub fn home(&self) -> &Path {
        &self.home
    }
}
