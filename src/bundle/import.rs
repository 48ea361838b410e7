//! Bundle import: unpack an archive, install its assets by basename, and
//! commit the rewritten record to the settings store.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::SETTINGS_DOCUMENT;
use crate::archive::ArchiveService;
use crate::assets::{AssetKind, AssetRef, file_digest, referenced_assets};
use crate::config::{AppPaths, ConfigRecord, ConfigStore, MissingAssetPolicy, reset_dir};
use crate::error::{BundleError, Result};

/// What happened to one referenced asset during import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetOutcome {
    /// Copied from the bundle into storage.
    Installed,
    /// A file with the same name was already installed and was kept.
    Reused,
    /// Not in the bundle and not installed; the record keeps its old path.
    Skipped,
}

/// Per-asset import result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedAsset {
    pub kind: AssetKind,
    pub basename: String,
    /// Path now stored in the record.
    pub path: String,
    pub outcome: AssetOutcome,
}

/// Outcome of a successful import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    /// Name of the imported record.
    pub name: String,
    pub assets: Vec<MergedAsset>,
}

impl ImportReport {
    pub fn count(&self, outcome: AssetOutcome) -> usize {
        self.assets.iter().filter(|a| a.outcome == outcome).count()
    }
}

/// Restores bundles into application storage and the settings store.
pub struct BundleImporter {
    paths: AppPaths,
    archive: Arc<dyn ArchiveService>,
    on_missing: MissingAssetPolicy,
    store: Arc<ConfigStore>,
}

impl BundleImporter {
    pub fn new(
        paths: AppPaths,
        archive: Arc<dyn ArchiveService>,
        on_missing: MissingAssetPolicy,
        store: Arc<ConfigStore>,
    ) -> Self {
        Self {
            paths,
            archive,
            on_missing,
            store,
        }
    }

    /// Import archive bytes and make the result the current configuration.
    ///
    /// The store is only touched after every earlier step succeeded.
    #[instrument(skip_all, fields(bytes = bytes.len()))]
    pub fn import_bytes(&self, bytes: &[u8]) -> Result<ImportReport> {
        let (record, report) = self.stage_and_merge(bytes)?;
        self.store.replace(record);
        info!(
            name = %report.name,
            installed = report.count(AssetOutcome::Installed),
            reused = report.count(AssetOutcome::Reused),
            skipped = report.count(AssetOutcome::Skipped),
            "Bundle imported"
        );
        Ok(report)
    }

    /// Unpack and merge without committing. Installed assets are written.
    pub fn stage_and_merge(&self, bytes: &[u8]) -> Result<(ConfigRecord, ImportReport)> {
        self.persist_archive(bytes)?;

        let staging = self.paths.staging_dir();
        reset_dir(&staging)?;
        self.archive.unpack(bytes, &staging)?;

        let result = self.merge_from(&staging);

        if let Err(e) = std::fs::remove_dir_all(&staging) {
            warn!(dir = %staging.display(), error = %e, "Cannot remove staging directory");
        }
        result
    }

    fn persist_archive(&self, bytes: &[u8]) -> Result<()> {
        let archive_path = self.paths.temp_archive();
        if let Some(parent) = archive_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if archive_path.exists() {
            std::fs::remove_file(&archive_path)?;
        }
        std::fs::write(&archive_path, bytes)?;
        debug!(path = %archive_path.display(), "Saved incoming archive");
        Ok(())
    }

    fn merge_from(&self, staging: &Path) -> Result<(ConfigRecord, ImportReport)> {
        let mut record = read_document(&staging.join(SETTINGS_DOCUMENT))?;
        let mut merged = Vec::new();

        for asset in referenced_assets(&record) {
            let dir = asset.kind.install_dir(&self.paths);
            std::fs::create_dir_all(&dir)?;
            let installed = dir.join(&asset.basename);
            let staged = staging.join(&asset.basename);

            let outcome = if asset.basename == SETTINGS_DOCUMENT {
                self.missing_asset(&asset, "asset is named like the settings document")?
            } else if installed.is_file() {
                log_reuse(&installed, &staged);
                AssetOutcome::Reused
            } else if staged.is_file() {
                std::fs::copy(&staged, &installed)?;
                debug!(kind = %asset.kind, path = %installed.display(), "Installed asset");
                AssetOutcome::Installed
            } else {
                self.missing_asset(&asset, "asset missing from bundle")?
            };

            let path = if outcome == AssetOutcome::Skipped {
                asset.source
            } else {
                let path = path_string(&installed);
                asset.kind.set_path_in(&mut record, path.clone());
                path
            };

            merged.push(MergedAsset {
                kind: asset.kind,
                basename: asset.basename,
                path,
                outcome,
            });
        }

        let report = ImportReport {
            name: record.name.clone(),
            assets: merged,
        };
        Ok((record, report))
    }

    /// Apply the missing-asset policy to an asset the bundle cannot supply.
    fn missing_asset(&self, asset: &AssetRef, reason: &str) -> Result<AssetOutcome> {
        match self.on_missing {
            MissingAssetPolicy::Skip => {
                warn!(kind = %asset.kind, basename = %asset.basename, reason, "Keeping original asset path");
                Ok(AssetOutcome::Skipped)
            }
            MissingAssetPolicy::Fail => Err(BundleError::AssetReadFailure {
                path: asset.basename.clone(),
                reason: format!("{}: {reason}", asset.kind),
            }),
        }
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn read_document(path: &Path) -> Result<ConfigRecord> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| BundleError::MalformedDocument(format!("{SETTINGS_DOCUMENT}: {e}")))?;
    ConfigRecord::from_document(&text)
        .map_err(|e| BundleError::MalformedDocument(format!("{SETTINGS_DOCUMENT}: {e}")))
}

fn log_reuse(installed: &Path, staged: &Path) {
    if !staged.is_file() {
        debug!(path = %installed.display(), "Reusing installed asset");
        return;
    }
    match (file_digest(installed), file_digest(staged)) {
        (Ok(a), Ok(b)) if a != b => warn!(
            path = %installed.display(),
            "Installed asset differs from the bundled copy, keeping the installed one"
        ),
        _ => debug!(path = %installed.display(), "Reusing installed asset"),
    }
}
