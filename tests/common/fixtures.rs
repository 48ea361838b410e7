//! Test fixture helpers for creating temporary environments.
//!
//! A [`TestEnv`] is one simulated installation: its own data dir (installed
//! fonts and backgrounds), cache dir (staging) and settings store, all inside
//! a temporary directory that is removed on drop.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rcb::archive::ZipArchiveService;
use rcb::bundle::BundleEngine;
use rcb::config::{AppPaths, BgType, ConfigRecord, ConfigStore, DisplayMode, MissingAssetPolicy};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Font bytes written by [`TestEnv::styled_record`].
pub const FONT_BYTES: &[u8] = b"\x00\x01\x00\x00fake-truetype";

pub struct TestEnv {
    pub dir: TempDir,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.root().join("data")
    }

    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.root().join("cache")
    }

    #[must_use]
    pub fn out_dir(&self) -> PathBuf {
        self.root().join("out")
    }

    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.data_dir().join("readConfigs.json")
    }

    #[must_use]
    pub fn paths(&self) -> AppPaths {
        AppPaths::new(self.data_dir(), self.cache_dir())
    }

    /// Engine over an in-memory store starting with `record`.
    #[must_use]
    pub fn engine(&self, record: ConfigRecord, policy: MissingAssetPolicy) -> Arc<BundleEngine> {
        Arc::new(BundleEngine::new(
            self.paths(),
            Arc::new(ZipArchiveService::new()),
            policy,
            Arc::new(ConfigStore::in_memory(record)),
        ))
    }

    /// Write a file under the environment root, creating parent dirs.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write_file(&self, relative: &str, bytes: &[u8]) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(&path, bytes).unwrap_or_else(|_| panic!("Failed to write {path:?}"));
        path
    }

    /// A record with a custom font and a distinct image background for every
    /// display mode, plus layout fields the engine does not interpret.
    #[must_use]
    pub fn styled_record(&self, name: &str) -> ConfigRecord {
        let font = self.write_file("user/fonts/LXGWWenKai.ttf", FONT_BYTES);
        let day = self.write_file("user/pictures/paper.jpg", b"day-image");
        let night = self.write_file("user/pictures/stars.png", b"night-image");
        let eink = self.write_file("user/pictures/plain.bmp", b"eink-image");

        let mut record = ConfigRecord::named(name);
        record.text_font = path_str(&font);
        record.set_background(DisplayMode::Day, BgType::Image, path_str(&day));
        record.set_background(DisplayMode::Night, BgType::Image, path_str(&night));
        record.set_background(DisplayMode::EInk, BgType::Image, path_str(&eink));
        record.set_text_color(DisplayMode::Night, "#FFC0C0C0");
        record.extra.insert("textSize".into(), 22.into());
        record.extra.insert("lineSpacingExtra".into(), 12.into());
        record.extra.insert("titleBold".into(), true.into());
        record
    }
}

#[must_use]
pub fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Build ZIP bytes from `(entry name, contents)` pairs.
///
/// # Panics
///
/// Panics if the archive cannot be written.
#[must_use]
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("Failed to start zip entry");
        writer.write_all(contents).expect("Failed to write zip entry");
    }
    writer.finish().expect("Failed to finish zip").into_inner()
}

/// Sorted entry names of ZIP bytes.
///
/// # Panics
///
/// Panics if the bytes are not a ZIP archive.
#[must_use]
pub fn entry_names(bytes: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("Not a zip archive");
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}
