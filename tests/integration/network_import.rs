//! Importing bundles fetched over HTTP from a loopback server.

use std::time::Duration;

use rcb::config::{ConfigRecord, MissingAssetPolicy};
use rcb::error::ErrorKind;
use rcb::source::{ByteSource, ImportSelection};
use rcb::task;

use crate::common::fixtures::{TestEnv, zip_bytes};
use crate::common::http::OneShotServer;
use crate::common::init_test_logging;

const TIMEOUT: Option<Duration> = Some(Duration::from_secs(10));

#[tokio::test]
async fn test_remote_bundle_is_imported() {
    init_test_logging();
    let bundle = zip_bytes(&[
        ("readConfig.json", br#"{"name": "Remote", "bgType": 2, "bgStr": "/x/sky.png"}"#.as_slice()),
        ("sky.png", b"sky".as_slice()),
    ]);
    let server = OneShotServer::start(200, "OK", bundle);

    let target = TestEnv::new();
    let engine = target.engine(ConfigRecord::default(), MissingAssetPolicy::Skip);
    let source = match ImportSelection::parse(&server.url) {
        ImportSelection::Source(source) => source,
        ImportSelection::NetworkPrompt => panic!("URL parsed as the prompt sentinel"),
    };
    assert!(matches!(source, ByteSource::Remote(_)));

    let report = task::spawn_import(engine.clone(), source, TIMEOUT)
        .await
        .unwrap()
        .unwrap();
    server.join();

    assert_eq!(report.name, "Remote");
    let installed = target.data_dir().join("bg").join("sky.png");
    assert_eq!(std::fs::read(&installed).unwrap(), b"sky");
    assert_eq!(engine.store().current().bg_str, installed.to_string_lossy());
    assert!(target.cache_dir().join("readConfig.zip").is_file());
}

#[tokio::test]
async fn test_http_error_status_is_network_failure() {
    init_test_logging();
    let server = OneShotServer::start(404, "Not Found", b"missing".to_vec());

    let target = TestEnv::new();
    let engine = target.engine(ConfigRecord::named("unchanged"), MissingAssetPolicy::Skip);

    let err = task::spawn_import(engine.clone(), ByteSource::Remote(server.url.clone()), TIMEOUT)
        .await
        .unwrap()
        .unwrap_err();
    server.join();

    assert_eq!(err.kind(), ErrorKind::NetworkFailure);
    assert_eq!(engine.store().current().name, "unchanged");
    assert!(!target.cache_dir().join("readConfig.zip").exists());
}

#[tokio::test]
async fn test_remote_garbage_is_unpack_failure() {
    let server = OneShotServer::start(200, "OK", b"<html>not a bundle</html>".to_vec());

    let target = TestEnv::new();
    let engine = target.engine(ConfigRecord::named("unchanged"), MissingAssetPolicy::Skip);

    let err = task::spawn_import(engine.clone(), ByteSource::Remote(server.url.clone()), TIMEOUT)
        .await
        .unwrap()
        .unwrap_err();
    server.join();

    assert_eq!(err.kind(), ErrorKind::UnpackFailure);
    assert_eq!(engine.store().current().name, "unchanged");
}
