//! Path helpers: home expansion, basename extraction, and the fixed
//! application storage layout.
//!
//! ```text
//! <data_dir>/
//! ├── font/            # installed fonts, addressed by basename
//! └── bg/              # installed background images
//! <cache_dir>/
//! ├── readConfig/      # staging directory, cleared on every run
//! └── readConfig.zip   # temporary archive
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::{BundleError, Result};

/// Name of the staging directory under the cache dir.
pub const STAGING_DIR_NAME: &str = "readConfig";

/// Default archive file name, also used for the temporary archive.
pub const DEFAULT_ARCHIVE_NAME: &str = "readConfig.zip";

/// Installed font subdirectory.
pub const FONT_DIR_NAME: &str = "font";

/// Installed background subdirectory.
pub const BG_DIR_NAME: &str = "bg";

/// Expand a leading `~` to the home directory; other paths are returned as-is.
pub fn expand_home(path: &Path) -> Result<PathBuf> {
    let path_str = path.to_string_lossy();

    if path_str == "~" || path_str.starts_with("~/") {
        let home = home_dir()?;
        let rest = path_str.strip_prefix("~/").unwrap_or("");
        let resolved = if rest.is_empty() { home } else { home.join(rest) };
        debug!(
            original = %path.display(),
            resolved = %resolved.display(),
            "Expanded home directory path"
        );
        return Ok(resolved);
    }

    Ok(path.to_path_buf())
}

/// Resolve the user's home directory (cross-platform).
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| BundleError::ConfigInvalid("Could not determine home directory".to_string()))
}

/// Final segment of a path string, splitting on both `/` and `\`.
///
/// Documents may come from another platform, so the split does not rely on
/// the host separator. Returns `None` for names that cannot be used as a
/// plain file name (empty, `.` or `..`).
pub fn basename(path: &str) -> Option<&str> {
    let name = path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path);
    trace!(path, name, "Extracted basename");
    match name {
        "" | "." | ".." => None,
        _ => Some(name),
    }
}

/// Storage layout used by the exporter and importer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    data_dir: PathBuf,
    cache_dir: PathBuf,
}

impl AppPaths {
    pub fn new(data_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            cache_dir: cache_dir.into(),
        }
    }

    /// Root of installed assets.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn font_dir(&self) -> PathBuf {
        self.data_dir.join(FONT_DIR_NAME)
    }

    pub fn bg_dir(&self) -> PathBuf {
        self.data_dir.join(BG_DIR_NAME)
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.cache_dir.join(STAGING_DIR_NAME)
    }

    pub fn temp_archive(&self) -> PathBuf {
        self.cache_dir.join(DEFAULT_ARCHIVE_NAME)
    }
}

/// Remove a directory tree if present and create it empty.
pub fn reset_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        debug!(dir = %dir.display(), "Clearing directory");
        std::fs::remove_dir_all(dir)?;
    }
    std::fs::create_dir_all(dir)?;
    Ok(())
}
