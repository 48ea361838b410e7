//! Binary assets referenced by a configuration record.
//!
//! A record can point at up to four files: a custom font and one custom
//! background image per display mode. Assets are identified by basename both
//! inside a bundle and in the installed `font/` and `bg/` directories.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};

use crate::config::{AppPaths, BgType, ConfigRecord, DisplayMode, basename};
use crate::error::{BundleError, Result};

/// The slot of a record an asset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetKind {
    Font,
    BgDay,
    BgNight,
    BgEInk,
}

impl AssetKind {
    pub const ALL: [Self; 4] = [Self::Font, Self::BgDay, Self::BgNight, Self::BgEInk];

    pub const fn for_mode(mode: DisplayMode) -> Self {
        match mode {
            DisplayMode::Day => Self::BgDay,
            DisplayMode::Night => Self::BgNight,
            DisplayMode::EInk => Self::BgEInk,
        }
    }

    pub const fn mode(self) -> Option<DisplayMode> {
        match self {
            Self::Font => None,
            Self::BgDay => Some(DisplayMode::Day),
            Self::BgNight => Some(DisplayMode::Night),
            Self::BgEInk => Some(DisplayMode::EInk),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Font => "font",
            Self::BgDay => "bg-day",
            Self::BgNight => "bg-night",
            Self::BgEInk => "bg-eink",
        }
    }

    /// Installed directory for this kind.
    pub fn install_dir(self, paths: &AppPaths) -> PathBuf {
        match self {
            Self::Font => paths.font_dir(),
            _ => paths.bg_dir(),
        }
    }

    /// Path field of `record` for this kind, if the record references a file.
    pub fn path_in(self, record: &ConfigRecord) -> Option<&str> {
        match self.mode() {
            None => (!record.text_font.is_empty()).then_some(record.text_font.as_str()),
            Some(mode) => match record.background(mode) {
                (BgType::Image, path) => Some(path),
                _ => None,
            },
        }
    }

    /// Rewrite the path field of `record` for this kind.
    pub fn set_path_in(self, record: &mut ConfigRecord, path: String) {
        match self.mode() {
            None => record.text_font = path,
            Some(mode) => *record.bg_str_mut(mode) = path,
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An asset reference taken from a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRef {
    pub kind: AssetKind,
    /// Path as written in the record.
    pub source: String,
    /// Final path segment of `source`.
    pub basename: String,
}

/// Every asset the record references, without touching the filesystem.
///
/// References whose path has no usable basename are dropped with a warning.
pub fn referenced_assets(record: &ConfigRecord) -> Vec<AssetRef> {
    AssetKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let source = kind.path_in(record)?;
            let Some(name) = basename(source) else {
                warn!(kind = %kind, path = source, "Asset path has no file name");
                return None;
            };
            Some(AssetRef {
                kind,
                source: source.to_string(),
                basename: name.to_string(),
            })
        })
        .collect()
}

/// Result of resolving a record's assets against local storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedAssets {
    /// Assets whose source file exists.
    pub present: Vec<AssetRef>,
    /// Assets whose source file is missing.
    pub missing: Vec<AssetRef>,
}

/// Enumerate the record's assets and check that each source file exists.
///
/// Missing files are reported, not raised; callers decide via policy.
#[instrument(skip_all, fields(name = %record.name))]
pub fn resolve_assets(record: &ConfigRecord) -> ResolvedAssets {
    let mut resolved = ResolvedAssets::default();
    for asset in referenced_assets(record) {
        if Path::new(&asset.source).is_file() {
            debug!(kind = %asset.kind, path = %asset.source, "Asset found");
            resolved.present.push(asset);
        } else {
            warn!(kind = %asset.kind, path = %asset.source, "Referenced asset does not exist");
            resolved.missing.push(asset);
        }
    }
    resolved
}

/// SHA-256 of a file as lowercase hex.
pub fn file_digest(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| BundleError::AssetReadFailure {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Copy a background image into `bg/` and point `mode` at it.
///
/// The installed file is overwritten when it already exists, since the user
/// picked this image explicitly. Returns the installed path.
#[instrument(skip(paths, record))]
pub fn install_background(
    paths: &AppPaths,
    record: &mut ConfigRecord,
    mode: DisplayMode,
    image: &Path,
) -> Result<PathBuf> {
    let source = image.to_string_lossy();
    let name = basename(&source).ok_or_else(|| BundleError::AssetReadFailure {
        path: source.to_string(),
        reason: "path has no file name".to_string(),
    })?;

    let dir = paths.bg_dir();
    std::fs::create_dir_all(&dir)?;
    let installed = dir.join(name);
    if same_file(image, &installed) {
        debug!(installed = %installed.display(), "Background image already installed");
    } else {
        std::fs::copy(image, &installed).map_err(|e| BundleError::AssetReadFailure {
            path: source.to_string(),
            reason: e.to_string(),
        })?;
    }

    record.set_background(mode, BgType::Image, installed.to_string_lossy());
    debug!(installed = %installed.display(), "Background image installed");
    Ok(installed)
}

/// True when both paths resolve to the same existing file.
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
