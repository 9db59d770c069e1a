//! Source Synchronizer
//!
//! Brings every package source up to date and merges their definitions into
//! the registry. Sync runs in two phases:
//!
//! 1. **Fetch**: one scoped thread per source clones or pulls its catalog,
//!    fingerprints it and parses it (or reuses the last parse when the
//!    fingerprint is unchanged). Failures are recorded per source.
//! 2. **Merge**: after every fetch has finished, the lowest-index definition
//!    of each `(name, version)` is written to the registry.
//!
//! Nothing is rolled back: when every source fails, the registry keeps what
//! the previous sync wrote.

mod merge;

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use tracing::{info, warn};

use crate::cache::{Snapshot, SourceCache};
use crate::catalog::PackageDefinition;
use crate::catalog::parser::parse_catalog;
use crate::error::{self, Result};
use crate::hash;
use crate::registry::RegistryStore;
use crate::source::PackageSource;

use merge::{Contribution, merge};

/// Outcome of one sync
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncResult {
    /// Names of the sources that were fetched and parsed
    pub succeeded: Vec<String>,
    /// Sources that failed, with the reason
    pub failed: Vec<(String, String)>,
    /// Registry entries written
    pub written: usize,
    /// Winning entries already stored with identical content
    pub unchanged: usize,
    /// Definitions discarded for a lower-index duplicate
    pub shadowed: usize,
    /// Sources whose catalog was parsed
    pub parsed: usize,
    /// Sources whose definitions came from their snapshot
    pub reused: usize,
    /// Definitions replaced by a higher revision within the same catalog
    pub superseded: usize,
}

impl SyncResult {
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty()
    }
}

struct Fetched {
    definitions: Vec<PackageDefinition>,
    reused: bool,
    superseded: usize,
}

/// Synchronizes package sources into a registry
pub struct Synchronizer {
    registry: Arc<dyn RegistryStore>,
    cache: SourceCache,
}

impl Synchronizer {
    pub fn new(registry: Arc<dyn RegistryStore>, cache: SourceCache) -> Self {
        Self { registry, cache }
    }

    /// Fetch every source and merge its definitions into the registry.
    ///
    /// With `force` set every catalog is fetched from scratch and parsed
    /// even if unchanged. Fails only when every source fails, or when the
    /// registry rejects the merge.
    pub fn sync(&self, sources: &[PackageSource], force: bool) -> Result<SyncResult> {
        info!(sources = sources.len(), force, "Synchronizing package sources");

        // one fetch per working copy; an entry that maps onto a claimed
        // working copy fails alone
        let mut claimed: HashMap<PathBuf, &str> = HashMap::new();
        let outcomes: Vec<(usize, &PackageSource, Result<Fetched>)> = thread::scope(|scope| {
            let handles: Vec<_> = sources
                .iter()
                .enumerate()
                .map(|(position, source)| {
                    let task = match claimed.entry(self.cache.workdir(source)) {
                        Entry::Vacant(slot) => {
                            slot.insert(source.name());
                            Ok(scope.spawn(move || self.fetch(source, force)))
                        }
                        Entry::Occupied(owner) => Err(error::source::fetch_failed(
                            source.name(),
                            format!("shares its working copy with source '{}'", owner.get()),
                        )),
                    };
                    (position, source, task)
                })
                .collect();

            handles
                .into_iter()
                .map(|(position, source, task)| {
                    let outcome = task.and_then(|handle| {
                        handle.join().unwrap_or_else(|_| {
                            Err(error::source::fetch_failed(source.name(), "fetch thread panicked"))
                        })
                    });
                    (position, source, outcome)
                })
                .collect()
        });

        let mut result = SyncResult::default();
        let mut contributions = Vec::new();

        for (position, source, outcome) in outcomes {
            match outcome {
                Ok(fetched) => {
                    result.superseded += fetched.superseded;
                    if fetched.reused {
                        result.reused += 1;
                    } else {
                        result.parsed += 1;
                    }
                    info!(
                        source = %source.name(),
                        packages = fetched.definitions.len(),
                        reused = fetched.reused,
                        "Source ready"
                    );
                    result.succeeded.push(source.name().to_string());
                    contributions.push(Contribution {
                        position,
                        source,
                        definitions: fetched.definitions,
                    });
                }
                Err(e) => {
                    warn!(source = %source.name(), error = %e, "Source failed to synchronize");
                    result.failed.push((source.name().to_string(), e.to_string()));
                }
            }
        }

        if !sources.is_empty() && contributions.is_empty() {
            let failures = result
                .failed
                .iter()
                .map(|(name, reason)| format!("{name}: {reason}"))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(error::source::sync_failed(result.failed.len(), failures));
        }

        let stats = merge(self.registry.as_ref(), contributions)?;
        result.written = stats.written;
        result.unchanged = stats.unchanged;
        result.shadowed = stats.shadowed;

        info!(
            succeeded = result.succeeded.len(),
            failed = result.failed.len(),
            written = result.written,
            unchanged = result.unchanged,
            shadowed = result.shadowed,
            superseded = result.superseded,
            "Synchronization finished"
        );
        Ok(result)
    }

    fn fetch(&self, source: &PackageSource, force: bool) -> Result<Fetched> {
        let workdir = self.cache.workdir(source);
        let fetched = source.fetch(&workdir, force)?;
        let fingerprint = hash::fingerprint(&fetched.root)?;

        if !force {
            if let Some(snapshot) = self
                .cache
                .load_snapshot(source)
                .filter(|s| s.fingerprint == fingerprint)
            {
                return Ok(Fetched {
                    definitions: restamp(snapshot.definitions, source),
                    reused: true,
                    superseded: 0,
                });
            }
        }

        let parsed = parse_catalog(&fetched.root, source)?;
        let snapshot = Snapshot {
            source_name: source.name().to_string(),
            fingerprint,
            revision: fetched.revision,
            definitions: parsed.definitions,
        };
        if let Err(e) = self.cache.store_snapshot(source, &snapshot) {
            warn!(source = %source.name(), error = %e, "Failed to store snapshot");
        }

        Ok(Fetched {
            definitions: snapshot.definitions,
            reused: false,
            superseded: parsed.superseded,
        })
    }
}

/// Snapshot definitions carry the source identity of the run that parsed
/// them; the current source value is authoritative.
fn restamp(mut definitions: Vec<PackageDefinition>, source: &PackageSource) -> Vec<PackageDefinition> {
    for definition in &mut definitions {
        definition.source_index = source.index();
        definition.source_name = source.name().to_string();
    }
    definitions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::load_active;
    use crate::testkit::{CatalogRepo, MemoryRegistry};
    use tempfile::TempDir;

    fn catalog(description: &str) -> CatalogRepo {
        let repo = CatalogRepo::new();
        repo.add_package("redis", "1.0", description, None, "{\"id\": \"/redis\"}");
        repo.commit("initial");
        repo
    }

    fn synchronizer() -> (Synchronizer, Arc<MemoryRegistry>, TempDir) {
        let cache_dir = TempDir::new().unwrap();
        let registry = Arc::new(MemoryRegistry::new());
        let sync = Synchronizer::new(registry.clone(), SourceCache::new(cache_dir.path()));
        (sync, registry, cache_dir)
    }

    #[test]
    fn test_sync_single_source() {
        let repo = catalog("redis");
        let (sync, registry, _cache) = synchronizer();
        let sources = [PackageSource::git("local", repo.url(), 0)];

        let result = sync.sync(&sources, false).unwrap();
        assert_eq!(result.succeeded, ["local"]);
        assert!(result.failed.is_empty());
        assert_eq!(result.written, 1);
        assert_eq!(result.parsed, 1);
        assert!(registry.entries().contains_key("catalog/0/redis/1.0"));
    }

    #[test]
    fn test_unchanged_resync_reuses_snapshot_and_writes_nothing() {
        let repo = catalog("redis");
        let (sync, registry, _cache) = synchronizer();
        let sources = [PackageSource::git("local", repo.url(), 0)];

        sync.sync(&sources, false).unwrap();
        let before = registry.entries();
        registry.reset_counts();

        let result = sync.sync(&sources, false).unwrap();
        assert_eq!(result.reused, 1);
        assert_eq!(result.parsed, 0);
        assert_eq!(result.written, 0);
        assert_eq!(result.unchanged, 1);
        assert_eq!(registry.put_count(), 0);
        assert_eq!(registry.entries(), before);
    }

    #[test]
    fn test_changed_source_is_parsed_again() {
        let repo = catalog("redis");
        let (sync, registry, _cache) = synchronizer();
        let sources = [PackageSource::git("local", repo.url(), 0)];
        sync.sync(&sources, false).unwrap();

        repo.add_package("kafka", "0.9", "kafka", None, "{}");
        repo.commit("add kafka");

        let result = sync.sync(&sources, false).unwrap();
        assert_eq!(result.parsed, 1);
        assert_eq!(result.written, 1);
        assert!(registry.entries().contains_key("catalog/0/kafka/0.9"));
    }

    #[test]
    fn test_force_reparses_unchanged_source() {
        let repo = catalog("redis");
        let (sync, _registry, cache) = synchronizer();
        let sources = [PackageSource::git("local", repo.url(), 0)];
        sync.sync(&sources, false).unwrap();

        let result = sync.sync(&sources, true).unwrap();
        assert_eq!(result.parsed, 1);
        assert_eq!(result.reused, 0);
        assert_eq!(result.written, 0);

        let checkout = SourceCache::new(cache.path()).workdir(&sources[0]).join("checkout");
        assert!(checkout.join("packages").is_dir());
    }

    #[test]
    fn test_force_replaces_the_working_copy() {
        let repo = catalog("redis");
        let (sync, _registry, cache) = synchronizer();
        let sources = [PackageSource::git("local", repo.url(), 0)];
        sync.sync(&sources, false).unwrap();

        let checkout = SourceCache::new(cache.path()).workdir(&sources[0]).join("checkout");
        // only a fresh clone loses state kept inside the repository
        let marker = checkout.join(".git").join("pkgplane-marker");
        std::fs::write(&marker, "left behind").unwrap();

        sync.sync(&sources, false).unwrap();
        assert!(marker.exists());

        sync.sync(&sources, true).unwrap();
        assert!(!marker.exists());
        assert!(checkout.join("packages").is_dir());
    }

    #[test]
    fn test_sources_sharing_a_location_sync_independently() {
        let repo = catalog("redis");
        let (sync, registry, _cache) = synchronizer();
        let sources = [
            PackageSource::git("a", repo.url(), 0),
            PackageSource::git("b", repo.url(), 0),
        ];

        let result = sync.sync(&sources, false).unwrap();
        assert_eq!(result.succeeded, ["a", "b"]);
        assert!(result.failed.is_empty());
        assert_eq!(result.shadowed, 1);

        let active = load_active(registry.as_ref()).unwrap();
        assert_eq!(active[&("redis".to_string(), "1.0".to_string())].source_name, "a");
    }

    #[test]
    fn test_repeated_source_entry_fails_alone() {
        let repo = catalog("redis");
        let (sync, registry, _cache) = synchronizer();
        let source = PackageSource::git("local", repo.url(), 0);

        let result = sync.sync(&[source.clone(), source], false).unwrap();
        assert_eq!(result.succeeded, ["local"]);
        assert_eq!(result.failed.len(), 1);
        assert!(result.failed[0].1.contains("shares its working copy"));
        assert!(registry.entries().contains_key("catalog/0/redis/1.0"));
    }

    #[test]
    fn test_later_revision_wins_within_a_source() {
        let repo = CatalogRepo::new();
        for (revision, description) in [("0", "old revision"), ("1", "new revision")] {
            let dir = format!("packages/R/redis/{revision}");
            repo.write_file(
                &format!("{dir}/package.json"),
                &format!(r#"{{"name":"redis","version":"1.0","description":"{description}"}}"#),
            );
            repo.write_file(&format!("{dir}/marathon.json"), "{}");
        }
        repo.commit("two revisions of redis 1.0");

        let (sync, registry, _cache) = synchronizer();
        let result = sync
            .sync(&[PackageSource::git("local", repo.url(), 0)], false)
            .unwrap();
        assert_eq!(result.shadowed, 0);
        assert_eq!(result.superseded, 1);

        let active = load_active(registry.as_ref()).unwrap();
        let redis = &active[&("redis".to_string(), "1.0".to_string())];
        assert_eq!(redis.metadata.description, "new revision");
    }

    #[test]
    fn test_partial_failure_keeps_other_sources() {
        let repo = catalog("redis");
        let (sync, registry, cache) = synchronizer();
        let missing = cache.path().join("no-such-catalog");
        let sources = [
            PackageSource::git("broken", missing.display().to_string(), 0),
            PackageSource::git("local", repo.url(), 1),
        ];

        let result = sync.sync(&sources, false).unwrap();
        assert!(result.is_partial());
        assert_eq!(result.succeeded, ["local"]);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].0, "broken");
        assert!(registry.entries().contains_key("catalog/1/redis/1.0"));
    }

    #[test]
    fn test_all_sources_failing_leaves_registry_untouched() {
        let repo = catalog("redis");
        let (sync, registry, cache) = synchronizer();
        sync.sync(&[PackageSource::git("local", repo.url(), 0)], false)
            .unwrap();
        let before = registry.entries();

        let missing = cache.path().join("gone");
        let err = sync
            .sync(&[PackageSource::git("gone", missing.display().to_string(), 0)], false)
            .unwrap_err();

        assert!(matches!(err, crate::error::PkgError::SyncFailed { count: 1, .. }));
        assert_eq!(registry.entries(), before);
    }

    #[test]
    fn test_no_sources_is_a_no_op() {
        let (sync, registry, _cache) = synchronizer();
        let result = sync.sync(&[], false).unwrap();
        assert_eq!(result, SyncResult::default());
        assert!(registry.entries().is_empty());
    }

    #[test]
    fn test_precedence_across_sources() {
        let mesosphere = catalog("mesosphere redis");
        let mantl = catalog("mantl redis");
        let (sync, registry, _cache) = synchronizer();
        let sources = [
            PackageSource::git("mantl", mantl.url(), 1),
            PackageSource::git("mesosphere", mesosphere.url(), 0),
        ];

        let result = sync.sync(&sources, true).unwrap();
        assert_eq!(result.shadowed, 1);

        let active = load_active(registry.as_ref()).unwrap();
        let redis = &active[&("redis".to_string(), "1.0".to_string())];
        assert_eq!(redis.source_name, "mesosphere");
        assert_eq!(redis.metadata.description, "mesosphere redis");
    }
}
