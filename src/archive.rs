//! Archive packing and unpacking for bundles.
//!
//! The engine talks to archives only through [`ArchiveService`]; the ZIP
//! implementation is the one used in production.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, trace, warn};
use zip::ZipArchive;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{BundleError, Result};

/// One file to place into an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackEntry {
    /// File on disk to read.
    pub source: PathBuf,
    /// Name of the entry inside the archive.
    pub name: String,
}

impl PackEntry {
    pub fn new(source: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            name: name.into(),
        }
    }
}

/// Pack files into an archive and unpack archives into directories.
pub trait ArchiveService: Send + Sync {
    /// Pack the entries, in order, into archive bytes.
    ///
    /// Zero-length files are allowed; a repeated entry name is an error.
    fn pack(&self, entries: &[PackEntry]) -> Result<Vec<u8>>;

    /// Unpack archive bytes into `dest`, creating it if needed and
    /// overwriting files of the same name. Returns the extracted file names.
    fn unpack(&self, archive: &[u8], dest: &Path) -> Result<Vec<String>>;
}

/// ZIP (deflate) archive service.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiveService;

impl ZipArchiveService {
    pub const fn new() -> Self {
        Self
    }

    fn unpack_from<R: Read + Seek>(reader: R, dest: &Path) -> Result<Vec<String>> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| BundleError::UnpackFailure(format!("Invalid ZIP archive: {e}")))?;

        std::fs::create_dir_all(dest)
            .map_err(|e| BundleError::UnpackFailure(format!("Cannot create {}: {e}", dest.display())))?;

        let mut extracted = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i).map_err(|e| {
                BundleError::UnpackFailure(format!("Failed to read archive entry: {e}"))
            })?;

            let Some(relative) = file.enclosed_name() else {
                warn!(entry = file.name(), "Skipping archive entry with unsafe path");
                continue;
            };
            let out_path = dest.join(&relative);

            if file.is_dir() {
                std::fs::create_dir_all(&out_path)?;
                continue;
            }
            if let Some(parent) = out_path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let mut out = File::create(&out_path).map_err(|e| {
                BundleError::UnpackFailure(format!("Cannot write {}: {e}", out_path.display()))
            })?;
            let bytes = io::copy(&mut file, &mut out).map_err(|e| {
                BundleError::UnpackFailure(format!("Failed to extract {}: {e}", file.name()))
            })?;
            trace!(entry = file.name(), bytes, "Extracted entry");
            extracted.push(file.name().to_string());
        }

        Ok(extracted)
    }
}

impl ArchiveService for ZipArchiveService {
    #[instrument(skip_all, fields(entries = entries.len()))]
    fn pack(&self, entries: &[PackEntry]) -> Result<Vec<u8>> {
        let mut seen = HashSet::new();
        for entry in entries {
            if !seen.insert(entry.name.as_str()) {
                return Err(BundleError::PackFailure(format!(
                    "Duplicate archive entry name: {}",
                    entry.name
                )));
            }
        }

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in entries {
            let mut source = File::open(&entry.source).map_err(|e| {
                BundleError::PackFailure(format!("Cannot open {}: {e}", entry.source.display()))
            })?;
            zip.start_file(entry.name.as_str(), options)
                .map_err(|e| BundleError::PackFailure(format!("Cannot add {}: {e}", entry.name)))?;
            let bytes = io::copy(&mut source, &mut zip)
                .map_err(|e| BundleError::PackFailure(format!("Cannot write {}: {e}", entry.name)))?;
            trace!(entry = %entry.name, bytes, "Packed entry");
        }

        let mut cursor = zip
            .finish()
            .map_err(|e| BundleError::PackFailure(format!("Cannot finish archive: {e}")))?;
        cursor.flush()?;
        let data = cursor.into_inner();
        debug!(bytes = data.len(), "Archive packed");
        Ok(data)
    }

    #[instrument(skip_all, fields(dest = %dest.display(), bytes = archive.len()))]
    fn unpack(&self, archive: &[u8], dest: &Path) -> Result<Vec<String>> {
        let extracted = Self::unpack_from(Cursor::new(archive), dest)?;
        debug!(files = extracted.len(), "Archive unpacked");
        Ok(extracted)
    }
}
