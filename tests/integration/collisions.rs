//! Importing over assets that are already installed.

use std::fs;
use std::time::Duration;

use rcb::bundle::AssetOutcome;
use rcb::config::{ConfigRecord, MissingAssetPolicy};
use rcb::destination::ExportDestination;

use crate::common::fixtures::{TestEnv, path_str};
use crate::common::init_test_logging;

fn exported_bundle(source: &TestEnv, name: &str) -> Vec<u8> {
    let report = source
        .engine(source.styled_record(name), MissingAssetPolicy::Skip)
        .export_current(&ExportDestination::directory(source.out_dir()))
        .unwrap();
    fs::read(source.out_dir().join(report.file_name)).unwrap()
}

#[test]
fn test_reimport_leaves_installed_files_untouched() {
    init_test_logging();
    let source = TestEnv::new();
    let bytes = exported_bundle(&source, "Again");

    let target = TestEnv::new();
    let importer = target.engine(ConfigRecord::default(), MissingAssetPolicy::Skip);
    let first = importer.import_bytes(&bytes).unwrap();
    assert_eq!(first.count(AssetOutcome::Installed), 4);

    let font = target.data_dir().join("font").join("LXGWWenKai.ttf");
    let before = fs::metadata(&font).unwrap().modified().unwrap();
    let record_after_first = importer.store().current();

    // Coarse filesystem clocks need a gap to show a rewrite.
    std::thread::sleep(Duration::from_millis(1100));
    let second = importer.import_bytes(&bytes).unwrap();

    assert_eq!(second.count(AssetOutcome::Reused), 4);
    assert_eq!(second.count(AssetOutcome::Installed), 0);
    assert_eq!(fs::metadata(&font).unwrap().modified().unwrap(), before);
    assert_eq!(importer.store().current(), record_after_first);
}

#[test]
fn test_existing_file_with_same_name_wins() {
    init_test_logging();
    let source = TestEnv::new();
    let bytes = exported_bundle(&source, "Clash");

    let target = TestEnv::new();
    let local = target.write_file("data/bg/paper.jpg", b"local paper");
    let importer = target.engine(ConfigRecord::default(), MissingAssetPolicy::Skip);

    let report = importer.import_bytes(&bytes).unwrap();

    let paper = report
        .assets
        .iter()
        .find(|a| a.basename == "paper.jpg")
        .unwrap();
    assert_eq!(paper.outcome, AssetOutcome::Reused);
    assert_eq!(paper.path, path_str(&local));
    assert_eq!(fs::read(&local).unwrap(), b"local paper");
    assert_eq!(report.count(AssetOutcome::Installed), 3);
}

#[test]
fn test_import_replaces_only_current_record() {
    let source = TestEnv::new();
    let bytes = exported_bundle(&source, "Incoming");

    let target = TestEnv::new();
    let importer = target.engine(ConfigRecord::named("first"), MissingAssetPolicy::Skip);
    let store = importer.store();
    store.add(ConfigRecord::named("second"));
    store.select(1).unwrap();
    let mut events = store.subscribe();

    importer.import_bytes(&bytes).unwrap();

    let names: Vec<String> = store.records().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["first", "Incoming"]);
    assert_eq!(store.current_index(), 1);
    assert!(events.try_recv().is_ok());
}
