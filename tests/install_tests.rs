//! Install and uninstall scenarios against synced git catalogs

mod common;

use common::{Harness, redis_catalog};
use pkgplane::error::{ErrorKind, PkgError};
use pkgplane::operations::PackageRequest;
use pkgplane::scheduler::{DeleteOutcome, LABEL_PACKAGE_NAME, LABEL_PACKAGE_VERSION};
use pkgplane::source::PackageSource;
use serde_json::json;

fn synced() -> (Harness, pkgplane::testkit::CatalogRepo) {
    let repo = redis_catalog("Redis");
    let harness = Harness::new(vec![PackageSource::git("mesosphere", repo.url(), 0)]);
    harness.orchestrator.sync(false).unwrap();
    (harness, repo)
}

#[test]
fn test_install_submits_exactly_one_tagged_job() {
    let (harness, _repo) = synced();

    let request = PackageRequest::parse(br#"{"name": "redis", "options": {"memory": 256}}"#).unwrap();
    harness.orchestrator.install_package(&request).unwrap();

    assert_eq!(harness.scheduler.submit_count(), 1);
    let job = &harness.scheduler.submitted()[0];
    assert_eq!(job["id"], "/redis");
    assert_eq!(job["mem"], 256);
    assert_eq!(job["env"]["ZK"], "zookeeper.service.consul:2181");
    assert_eq!(job["labels"][LABEL_PACKAGE_NAME], "redis");
    assert_eq!(job["labels"][LABEL_PACKAGE_VERSION], "1.0");
}

#[test]
fn test_install_unknown_package_never_reaches_scheduler() {
    let (harness, _repo) = synced();

    let err = harness
        .orchestrator
        .install_package(&PackageRequest::new("cassandra"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(harness.scheduler.submit_count(), 0);
}

#[test]
fn test_install_unknown_option_never_reaches_scheduler() {
    let (harness, _repo) = synced();

    let request = PackageRequest::new("redis")
        .with_option("memory", json!(256))
        .with_option("replicas", json!(3));
    let err = harness.orchestrator.install_package(&request).unwrap_err();
    assert!(matches!(err, PkgError::UnknownOption { .. }));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(harness.scheduler.submit_count(), 0);
}

#[test]
fn test_installed_package_is_found_by_labels() {
    let (harness, _repo) = synced();
    let request = PackageRequest::new("redis").with_option("memory", json!(64));
    harness.orchestrator.install_package(&request).unwrap();

    let app = harness
        .orchestrator
        .find_installed(&PackageRequest::new("redis"))
        .unwrap()
        .unwrap();
    assert_eq!(app.id, "/redis");
    assert_eq!(app.package_version(), Some("1.0"));
}

#[test]
fn test_uninstall_absent_package_skips_delete() {
    let (harness, _repo) = synced();

    let found = harness
        .orchestrator
        .find_installed(&PackageRequest::new("redis"))
        .unwrap();
    assert!(found.is_none());
    assert_eq!(harness.scheduler.delete_count(), 0);
}

#[test]
fn test_uninstall_twice() {
    let (harness, _repo) = synced();
    let request = PackageRequest::new("redis").with_option("memory", json!(64));
    harness.orchestrator.install_package(&request).unwrap();

    let lookup = PackageRequest::new("redis");
    let app = harness.orchestrator.find_installed(&lookup).unwrap().unwrap();
    assert_eq!(
        harness.orchestrator.uninstall_package(&app).unwrap(),
        DeleteOutcome::Deleted
    );

    assert!(harness.orchestrator.find_installed(&lookup).unwrap().is_none());
    assert_eq!(harness.scheduler.delete_count(), 1);
}
