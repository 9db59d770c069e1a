//! Source synchronization and precedence through the orchestrator

mod common;

use common::{Harness, redis_catalog};
use pkgplane::cache::SourceCache;
use pkgplane::source::PackageSource;
use pkgplane::testkit::CatalogRepo;

#[test]
fn test_lowest_index_wins_after_forced_sync() {
    let mesosphere = redis_catalog("Redis from mesosphere");
    let mantl = redis_catalog("Redis from mantl");
    let harness = Harness::new(vec![
        PackageSource::git("mesosphere", mesosphere.url(), 0),
        PackageSource::git("mantl", mantl.url(), 1),
    ]);

    let result = harness.orchestrator.sync(true).unwrap();
    assert_eq!(result.succeeded.len(), 2);

    let redis = harness.orchestrator.package("redis", None).unwrap();
    assert_eq!(redis.source_name, "mesosphere");
    assert_eq!(redis.source_index, 0);
    assert_eq!(redis.metadata.description, "Redis from mesosphere");

    let packages = harness.orchestrator.packages().unwrap();
    assert_eq!(packages.len(), 1);
    assert_eq!(packages[0].description, "Redis from mesosphere");
}

#[test]
fn test_precedence_ignores_list_order() {
    let mesosphere = redis_catalog("Redis from mesosphere");
    let mantl = redis_catalog("Redis from mantl");
    let harness = Harness::new(vec![
        PackageSource::git("mantl", mantl.url(), 1),
        PackageSource::git("mesosphere", mesosphere.url(), 0),
    ]);

    harness.orchestrator.sync(false).unwrap();
    let redis = harness.orchestrator.package("redis", Some("1.0")).unwrap();
    assert_eq!(redis.source_name, "mesosphere");
}

#[test]
fn test_unchanged_resync_does_no_redundant_work() {
    let repo = redis_catalog("Redis");
    let harness = Harness::new(vec![PackageSource::git("local", repo.url(), 0)]);

    harness.orchestrator.sync(false).unwrap();
    let after_first = harness.registry.entries();
    harness.registry.reset_counts();

    let result = harness.orchestrator.sync(false).unwrap();
    assert_eq!(result.parsed, 0);
    assert_eq!(result.reused, 1);
    assert_eq!(harness.registry.put_count(), 0);
    assert_eq!(harness.registry.entries(), after_first);
}

#[test]
fn test_forced_sync_parses_every_source_again() {
    let first = redis_catalog("Redis");
    let second = CatalogRepo::new();
    second.add_package("kafka", "0.9.4", "Kafka", None, r#"{"id": "/kafka"}"#);
    second.commit("Add kafka");
    let harness = Harness::new(vec![
        PackageSource::git("first", first.url(), 0),
        PackageSource::git("second", second.url(), 1),
    ]);

    harness.orchestrator.sync(false).unwrap();

    let cache = SourceCache::new(harness.cache.path());
    let markers: Vec<_> = harness
        .orchestrator
        .sources()
        .iter()
        .map(|source| cache.workdir(source).join("checkout/.git/pkgplane-marker"))
        .collect();
    for marker in &markers {
        std::fs::write(marker, "stale").unwrap();
    }

    let result = harness.orchestrator.sync(true).unwrap();
    assert_eq!(result.parsed, 2);
    assert_eq!(result.reused, 0);
    assert_eq!(result.written, 0);
    assert_eq!(result.unchanged, 2);

    // every working copy was cloned again
    assert!(markers.iter().all(|marker| !marker.exists()));
}

#[test]
fn test_failed_source_does_not_hide_others() {
    let repo = redis_catalog("Redis");
    let harness = Harness::new(vec![
        PackageSource::git("gone", "/nonexistent/pkgplane/catalog", 0),
        PackageSource::git("local", repo.url(), 1),
    ]);

    let result = harness.orchestrator.sync(false).unwrap();
    assert!(result.is_partial());
    assert_eq!(result.failed[0].0, "gone");

    let redis = harness.orchestrator.package("redis", None).unwrap();
    assert_eq!(redis.source_name, "local");
}

#[test]
fn test_new_version_appears_after_resync() {
    let repo = redis_catalog("Redis");
    let harness = Harness::new(vec![PackageSource::git("local", repo.url(), 0)]);
    harness.orchestrator.sync(false).unwrap();

    repo.add_package("redis", "1.10", "Redis", None, r#"{"id": "/redis"}"#);
    repo.commit("Add redis 1.10");
    harness.orchestrator.sync(false).unwrap();

    let packages = harness.orchestrator.packages().unwrap();
    assert_eq!(packages[0].version, "1.10");
    assert_eq!(packages[0].versions, ["1.0", "1.10"]);
}
