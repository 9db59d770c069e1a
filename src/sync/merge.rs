//! Merge phase: write the winning definition of every `(name, version)`

use std::collections::BTreeMap;

use tracing::debug;

use crate::catalog::PackageDefinition;
use crate::error::{self, Result};
use crate::registry::{self, RegistryStore};
use crate::source::PackageSource;

/// Definitions one source contributed to a merge
pub(super) struct Contribution<'a> {
    /// Position in the caller's source list; breaks ties on equal index
    pub position: usize,
    pub source: &'a PackageSource,
    pub definitions: Vec<PackageDefinition>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(super) struct MergeStats {
    pub written: usize,
    pub unchanged: usize,
    pub shadowed: usize,
}

/// Pick, for every `(name, version)`, the definition from the source with
/// the lowest index and write it unless the stored value is identical.
///
/// The winner only depends on `(index, position)`, never on the order in
/// which `contributions` finished fetching.
pub(super) fn merge(
    store: &dyn RegistryStore,
    mut contributions: Vec<Contribution<'_>>,
) -> Result<MergeStats> {
    contributions.sort_by_key(|c| (c.source.index(), c.position));

    let mut stats = MergeStats::default();
    let mut winners: BTreeMap<(String, String), PackageDefinition> = BTreeMap::new();

    for contribution in contributions {
        for definition in contribution.definitions {
            let key = (definition.name.clone(), definition.version.clone());
            if winners.contains_key(&key) {
                debug!(
                    name = %key.0,
                    version = %key.1,
                    source = %contribution.source.name(),
                    "Shadowed by a higher-precedence source"
                );
                stats.shadowed += 1;
                continue;
            }
            winners.insert(key, definition);
        }
    }

    for definition in winners.values() {
        let key = registry::catalog_key(definition.source_index, &definition.name, &definition.version);
        let value = serde_json::to_vec(definition).map_err(|e| {
            error::registry::corrupt_entry(&key, format!("Failed to serialize definition: {e}"))
        })?;

        if store.get(&key)?.as_deref() == Some(value.as_slice()) {
            stats.unchanged += 1;
            continue;
        }

        store.put(&key, &value)?;
        stats.written += 1;
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{JobTemplate, PackageMetadata};
    use crate::testkit::MemoryRegistry;

    fn definition(name: &str, version: &str, source: &PackageSource, description: &str) -> PackageDefinition {
        PackageDefinition {
            name: name.to_string(),
            version: version.to_string(),
            source_index: source.index(),
            source_name: source.name().to_string(),
            metadata: PackageMetadata {
                description: description.to_string(),
                ..Default::default()
            },
            config_schema: Default::default(),
            job_template: JobTemplate::new("{}"),
        }
    }

    #[test]
    fn test_lowest_index_wins_regardless_of_order() {
        let mesosphere = PackageSource::git("mesosphere", "/m", 0);
        let mantl = PackageSource::git("mantl", "/n", 1);
        let store = MemoryRegistry::new();

        // mantl "finished first"
        let stats = merge(
            &store,
            vec![
                Contribution {
                    position: 1,
                    source: &mantl,
                    definitions: vec![definition("redis", "1.0", &mantl, "mantl redis")],
                },
                Contribution {
                    position: 0,
                    source: &mesosphere,
                    definitions: vec![definition("redis", "1.0", &mesosphere, "mesosphere redis")],
                },
            ],
        )
        .unwrap();

        assert_eq!(stats.written, 1);
        assert_eq!(stats.shadowed, 1);
        let entries = store.entries();
        assert_eq!(entries.len(), 1);
        assert!(entries.contains_key("catalog/0/redis/1.0"));
    }

    #[test]
    fn test_equal_index_breaks_tie_by_position() {
        let first = PackageSource::git("first", "/a", 0);
        let second = PackageSource::git("second", "/b", 0);
        let store = MemoryRegistry::new();

        merge(
            &store,
            vec![
                Contribution {
                    position: 1,
                    source: &second,
                    definitions: vec![definition("redis", "1.0", &second, "second")],
                },
                Contribution {
                    position: 0,
                    source: &first,
                    definitions: vec![definition("redis", "1.0", &first, "first")],
                },
            ],
        )
        .unwrap();

        let stored: PackageDefinition =
            serde_json::from_slice(&store.entries()["catalog/0/redis/1.0"]).unwrap();
        assert_eq!(stored.source_name, "first");
    }

    #[test]
    fn test_identical_values_are_not_rewritten() {
        let source = PackageSource::git("mesosphere", "/m", 0);
        let store = MemoryRegistry::new();
        let contribution = || Contribution {
            position: 0,
            source: &source,
            definitions: vec![
                definition("redis", "1.0", &source, "redis"),
                definition("kafka", "0.9", &source, "kafka"),
            ],
        };

        let first = merge(&store, vec![contribution()]).unwrap();
        assert_eq!(first.written, 2);

        store.reset_counts();
        let second = merge(&store, vec![contribution()]).unwrap();
        assert_eq!(second.written, 0);
        assert_eq!(second.unchanged, 2);
        assert_eq!(store.put_count(), 0);
    }

    #[test]
    fn test_registry_failure_is_reported() {
        let source = PackageSource::git("mesosphere", "/m", 0);
        let store = MemoryRegistry::new();
        store.set_unavailable(true);

        let result = merge(
            &store,
            vec![Contribution {
                position: 0,
                source: &source,
                definitions: vec![definition("redis", "1.0", &source, "redis")],
            }],
        );
        assert!(matches!(result, Err(crate::error::PkgError::RegistryUnavailable { .. })));
    }
}
