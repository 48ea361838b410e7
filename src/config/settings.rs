//! Engine settings loaded from `config.toml`.
//!
//! ```toml
//! data_dir = "~/.local/share/rcb"
//! cache_dir = "~/.cache/rcb"
//! on_missing_asset = "skip"   # or "fail"
//! network_timeout_secs = 30   # 0 disables the timeout
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::path::{AppPaths, expand_home};
use crate::error::{BundleError, Result};

/// Directory name used under the platform data/cache/config dirs.
pub const APP_DIR_NAME: &str = "rcb";

/// Settings store file name under the data dir.
pub const STORE_FILE_NAME: &str = "readConfigs.json";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// What to do when a referenced asset file is not available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingAssetPolicy {
    /// Leave the asset out and keep going.
    #[default]
    Skip,
    /// Abort the whole operation.
    Fail,
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSettings {
    /// Root for installed assets (`font/`, `bg/`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Root for staging and the temporary archive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    /// Settings store file; defaults to `<data_dir>/readConfigs.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
    #[serde(default)]
    pub on_missing_asset: MissingAssetPolicy,
    #[serde(default = "default_timeout_secs")]
    pub network_timeout_secs: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            data_dir: None,
            cache_dir: None,
            store_path: None,
            on_missing_asset: MissingAssetPolicy::Skip,
            network_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl EngineSettings {
    /// Parse settings from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| BundleError::ConfigParse(e.to_string()))
    }

    /// Load settings from a file.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            BundleError::ConfigInvalid(format!("Cannot read {}: {e}", path.display()))
        })?;
        let settings = Self::from_toml(&text)?;
        info!(path = %path.display(), "Loaded engine settings");
        Ok(settings)
    }

    /// Load from an explicit path, else from the default location when
    /// present, else defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(&expand_home(path)?);
        }
        match default_settings_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => {
                debug!("No settings file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Resolved storage layout.
    pub fn app_paths(&self) -> Result<AppPaths> {
        let data_dir = match &self.data_dir {
            Some(dir) => expand_home(dir)?,
            None => dirs::data_dir()
                .map(|d| d.join(APP_DIR_NAME))
                .ok_or_else(|| BundleError::ConfigInvalid("Could not determine data directory".to_string()))?,
        };
        let cache_dir = match &self.cache_dir {
            Some(dir) => expand_home(dir)?,
            None => dirs::cache_dir()
                .map(|d| d.join(APP_DIR_NAME))
                .unwrap_or_else(|| std::env::temp_dir().join(APP_DIR_NAME)),
        };
        Ok(AppPaths::new(data_dir, cache_dir))
    }

    /// Resolved settings store location.
    pub fn store_path(&self) -> Result<PathBuf> {
        match &self.store_path {
            Some(path) => expand_home(path),
            None => Ok(self.app_paths()?.data_dir().join(STORE_FILE_NAME)),
        }
    }

    /// Network timeout, or `None` when disabled.
    pub const fn network_timeout(&self) -> Option<Duration> {
        if self.network_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.network_timeout_secs))
        }
    }
}

/// Default settings file location (`<config_dir>/rcb/config.toml`).
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"))
}
