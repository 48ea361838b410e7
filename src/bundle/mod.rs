//! Configuration bundles.
//!
//! A bundle is a ZIP archive holding one settings document plus the font and
//! background files it references, each stored under its basename:
//!
//! ```text
//! Sepia.zip
//! ├── readConfig.json
//! ├── LXGWWenKai.ttf
//! └── paper.jpg
//! ```
//!
//! [`BundleEngine`] wires the exporter and importer to one storage layout,
//! archive service and settings store.

mod export;
mod import;

pub use export::{BundleExporter, ExportReport, export_file_name};
pub use import::{AssetOutcome, BundleImporter, ImportReport, MergedAsset};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::archive::{ArchiveService, ZipArchiveService};
use crate::assets::install_background;
use crate::config::{AppPaths, ConfigStore, DisplayMode, EngineSettings, MissingAssetPolicy};
use crate::destination::ExportDestination;
use crate::error::Result;

/// Entry name of the settings document inside a bundle.
pub const SETTINGS_DOCUMENT: &str = "readConfig.json";

/// Exporter and importer sharing one environment.
pub struct BundleEngine {
    paths: AppPaths,
    exporter: BundleExporter,
    importer: BundleImporter,
    store: Arc<ConfigStore>,
}

impl BundleEngine {
    pub fn new(
        paths: AppPaths,
        archive: Arc<dyn ArchiveService>,
        on_missing: MissingAssetPolicy,
        store: Arc<ConfigStore>,
    ) -> Self {
        Self {
            exporter: BundleExporter::new(paths.clone(), Arc::clone(&archive), on_missing),
            importer: BundleImporter::new(paths.clone(), archive, on_missing, Arc::clone(&store)),
            paths,
            store,
        }
    }

    /// Engine using the ZIP archive service and the layout from `settings`.
    pub fn from_settings(settings: &EngineSettings, store: Arc<ConfigStore>) -> Result<Self> {
        Ok(Self::new(
            settings.app_paths()?,
            Arc::new(ZipArchiveService::new()),
            settings.on_missing_asset,
            store,
        ))
    }

    pub const fn paths(&self) -> &AppPaths {
        &self.paths
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    pub const fn exporter(&self) -> &BundleExporter {
        &self.exporter
    }

    pub const fn importer(&self) -> &BundleImporter {
        &self.importer
    }

    /// Export the store's current record.
    pub fn export_current(&self, dest: &ExportDestination) -> Result<ExportReport> {
        self.exporter.export(&self.store.current(), dest)
    }

    /// Import archive bytes into the store.
    pub fn import_bytes(&self, bytes: &[u8]) -> Result<ImportReport> {
        self.importer.import_bytes(bytes)
    }

    /// Install `image` under `bg/` and make it the current record's
    /// background for `mode`.
    pub fn set_background_image(&self, mode: DisplayMode, image: &Path) -> Result<PathBuf> {
        let mut record = self.store.current();
        let installed = install_background(&self.paths, &mut record, mode, image)?;
        self.store.update_current(|current| *current = record);
        Ok(installed)
    }
}
