//! Bundle export: stage the settings document and its assets, pack them,
//! and deliver the archive to a destination.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::SETTINGS_DOCUMENT;
use crate::archive::{ArchiveService, PackEntry};
use crate::assets::{AssetRef, resolve_assets};
use crate::config::{AppPaths, ConfigRecord, DEFAULT_ARCHIVE_NAME, MissingAssetPolicy, reset_dir};
use crate::destination::ExportDestination;
use crate::error::{BundleError, Result, ResultExt};

/// Outcome of a successful export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    /// File name written at the destination.
    pub file_name: String,
    /// Path or URI of the written archive.
    pub location: String,
    /// Archive size in bytes.
    pub archive_bytes: usize,
    /// Assets packed into the bundle.
    pub packed: Vec<AssetRef>,
    /// Assets left out because their file was missing or unreadable.
    pub skipped: Vec<AssetRef>,
}

/// Archive file name for a record: its name, or the default when blank.
///
/// Path separators in the name are replaced so the result is a single
/// path segment.
pub fn export_file_name(record: &ConfigRecord) -> String {
    if record.name.trim().is_empty() {
        return DEFAULT_ARCHIVE_NAME.to_string();
    }
    let safe: String = record
        .name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{safe}.zip")
}

/// Builds bundles from configuration records.
pub struct BundleExporter {
    paths: AppPaths,
    archive: Arc<dyn ArchiveService>,
    on_missing: MissingAssetPolicy,
}

impl BundleExporter {
    pub fn new(paths: AppPaths, archive: Arc<dyn ArchiveService>, on_missing: MissingAssetPolicy) -> Self {
        Self {
            paths,
            archive,
            on_missing,
        }
    }

    /// Export `record` to `dest`.
    ///
    /// Only the cache area is written before the final destination write, so
    /// a failure in any earlier step leaves the destination untouched.
    #[instrument(skip_all, fields(name = %record.name, dest = %dest))]
    pub fn export(&self, record: &ConfigRecord, dest: &ExportDestination) -> Result<ExportReport> {
        let file_name = export_file_name(record);
        let staging = self.paths.staging_dir();
        reset_dir(&staging)?;

        let doc_path = staging.join(SETTINGS_DOCUMENT);
        let document = record.to_document().with_context(|| "Serializing settings document")?;
        std::fs::write(&doc_path, document)?;
        let mut entries = vec![PackEntry::new(&doc_path, SETTINGS_DOCUMENT)];

        let resolved = resolve_assets(record);
        let mut skipped = resolved.missing;
        if self.on_missing == MissingAssetPolicy::Fail {
            if let Some(asset) = skipped.first() {
                return Err(BundleError::AssetReadFailure {
                    path: asset.source.clone(),
                    reason: format!("{} file does not exist", asset.kind),
                });
            }
        }

        // basename -> source path of the copy already staged
        let mut staged: HashMap<String, String> = HashMap::new();
        let mut packed = Vec::new();

        for asset in resolved.present {
            if let Some(first) = staged.get(&asset.basename) {
                if first != &asset.source {
                    warn!(
                        kind = %asset.kind,
                        basename = %asset.basename,
                        kept = %first,
                        dropped = %asset.source,
                        "Different files share a basename, keeping the first"
                    );
                }
                packed.push(asset);
                continue;
            }
            if asset.basename == SETTINGS_DOCUMENT {
                warn!(kind = %asset.kind, "Asset name clashes with the settings document, skipping");
                skipped.push(asset);
                continue;
            }

            let target = staging.join(&asset.basename);
            match std::fs::copy(&asset.source, &target) {
                Ok(bytes) => {
                    debug!(kind = %asset.kind, basename = %asset.basename, bytes, "Staged asset");
                    entries.push(PackEntry::new(&target, asset.basename.clone()));
                    staged.insert(asset.basename.clone(), asset.source.clone());
                    packed.push(asset);
                }
                Err(e) => match self.on_missing {
                    MissingAssetPolicy::Skip => {
                        warn!(kind = %asset.kind, path = %asset.source, error = %e, "Cannot read asset, skipping");
                        skipped.push(asset);
                    }
                    MissingAssetPolicy::Fail => {
                        return Err(BundleError::AssetReadFailure {
                            path: asset.source,
                            reason: e.to_string(),
                        });
                    }
                },
            }
        }

        let bytes = self.archive.pack(&entries)?;
        std::fs::write(self.paths.temp_archive(), &bytes)?;

        let location = dest.write_file(&file_name, &bytes)?;
        info!(
            file = %file_name,
            location = %location,
            packed = packed.len(),
            skipped = skipped.len(),
            "Bundle exported"
        );

        Ok(ExportReport {
            file_name,
            location,
            archive_bytes: bytes.len(),
            packed,
            skipped,
        })
    }
}
