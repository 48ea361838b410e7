//! Archives that cannot be imported leave the store untouched.

use rcb::config::{ConfigRecord, MissingAssetPolicy};
use rcb::error::ErrorKind;

use crate::common::fixtures::{TestEnv, zip_bytes};
use crate::common::init_test_logging;

fn assert_rejected(bytes: &[u8], kind: ErrorKind) {
    let target = TestEnv::new();
    let importer = target.engine(ConfigRecord::named("keep me"), MissingAssetPolicy::Skip);
    let mut events = importer.store().subscribe();

    let err = importer.import_bytes(bytes).unwrap_err();

    assert_eq!(err.kind(), kind, "unexpected error: {err}");
    assert_eq!(importer.store().current().name, "keep me");
    assert!(events.try_recv().is_err());
}

#[test]
fn test_archive_without_document() {
    init_test_logging();
    let bytes = zip_bytes(&[("paper.jpg", b"img".as_slice())]);
    assert_rejected(&bytes, ErrorKind::MalformedDocument);
}

#[test]
fn test_document_is_not_json() {
    let bytes = zip_bytes(&[("readConfig.json", b"{ not json".as_slice())]);
    assert_rejected(&bytes, ErrorKind::MalformedDocument);
}

#[test]
fn test_document_with_wrong_types() {
    let bytes = zip_bytes(&[("readConfig.json", br#"{"name": 5, "bgType": "two"}"#.as_slice())]);
    assert_rejected(&bytes, ErrorKind::MalformedDocument);
}

#[test]
fn test_not_an_archive() {
    assert_rejected(b"PK but not really a zip file", ErrorKind::UnpackFailure);
}

#[test]
fn test_empty_bytes() {
    assert_rejected(&[], ErrorKind::UnpackFailure);
}

#[test]
fn test_minimal_document_gets_defaults() {
    let bytes = zip_bytes(&[("readConfig.json", br#"{"name": "Bare"}"#.as_slice())]);
    let target = TestEnv::new();
    let importer = target.engine(ConfigRecord::default(), MissingAssetPolicy::Fail);

    let report = importer.import_bytes(&bytes).unwrap();

    assert_eq!(report.name, "Bare");
    let mut expected = ConfigRecord::default();
    expected.name = "Bare".to_string();
    assert_eq!(importer.store().current(), expected);
}

#[test]
fn test_legacy_font_key_is_read() {
    let target = TestEnv::new();
    let bytes = zip_bytes(&[
        ("readConfig.json", br#"{"name": "Old", "fontPath": "/sdcard/Fonts/kai.ttf"}"#.as_slice()),
        ("kai.ttf", b"font".as_slice()),
    ]);
    let importer = target.engine(ConfigRecord::default(), MissingAssetPolicy::Skip);

    importer.import_bytes(&bytes).unwrap();

    let installed = target.data_dir().join("font").join("kai.ttf");
    assert_eq!(
        importer.store().current().text_font,
        installed.to_string_lossy()
    );
}
