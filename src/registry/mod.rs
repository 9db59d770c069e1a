//! Registry Store
//!
//! The registry is a consistent key-value store with a service catalog. It
//! holds the synced package definitions under
//! `catalog/<sourceIndex>/<name>/<version>` and answers service discovery
//! lookups.

pub mod consul;

use std::collections::BTreeMap;

use tracing::warn;

pub use consul::ConsulRegistry;

use crate::catalog::PackageDefinition;
use crate::error::Result;

/// Key prefix of synced package definitions
pub const CATALOG_PREFIX: &str = "catalog/";

/// A healthy instance of a catalog service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInstance {
    pub address: String,
    pub port: u16,
}

impl ServiceInstance {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }

    /// `address:port`, or just the address when no port is registered
    pub fn endpoint(&self) -> String {
        if self.port == 0 {
            self.address.clone()
        } else {
            format!("{}:{}", self.address, self.port)
        }
    }
}

/// Operations the core needs from the registry
pub trait RegistryStore: Send + Sync {
    /// Read one key; `None` when absent
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write one key atomically
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Every key under `prefix` with its value, in key order
    fn list(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>>;

    /// Healthy instances of `service`, optionally filtered by `tag`, in
    /// catalog order
    fn catalog_lookup(&self, service: &str, tag: Option<&str>) -> Result<Vec<ServiceInstance>>;
}

/// Registry key of a package definition
pub fn catalog_key(source_index: u32, name: &str, version: &str) -> String {
    format!("{CATALOG_PREFIX}{source_index}/{name}/{version}")
}

/// Split a registry key back into `(source_index, name, version)`
pub fn parse_catalog_key(key: &str) -> Option<(u32, &str, &str)> {
    let rest = key.strip_prefix(CATALOG_PREFIX)?;
    let mut parts = rest.splitn(3, '/');
    let index = parts.next()?.parse().ok()?;
    let name = parts.next().filter(|s| !s.is_empty())?;
    let version = parts.next().filter(|s| !s.is_empty())?;
    Some((index, name, version))
}

/// Read every stored definition, skipping entries that do not decode
pub fn read_definitions(store: &dyn RegistryStore) -> Result<Vec<PackageDefinition>> {
    let entries = store.list(CATALOG_PREFIX)?;
    let mut definitions = Vec::with_capacity(entries.len());

    for (key, value) in entries {
        if parse_catalog_key(&key).is_none() {
            continue;
        }
        match serde_json::from_slice::<PackageDefinition>(&value) {
            Ok(definition) => definitions.push(definition),
            Err(e) => warn!(%key, error = %e, "Skipping corrupt registry entry"),
        }
    }

    Ok(definitions)
}

/// Keep, for every `(name, version)`, the definition with the lowest
/// source index. Result is ordered by name then version.
pub fn select_active(
    definitions: impl IntoIterator<Item = PackageDefinition>,
) -> BTreeMap<(String, String), PackageDefinition> {
    let mut active: BTreeMap<(String, String), PackageDefinition> = BTreeMap::new();
    for definition in definitions {
        let key = (definition.name.clone(), definition.version.clone());
        match active.get(&key) {
            Some(current) if current.source_index <= definition.source_index => {}
            _ => {
                active.insert(key, definition);
            }
        }
    }
    active
}

/// The active definitions currently stored in the registry
pub fn load_active(store: &dyn RegistryStore) -> Result<BTreeMap<(String, String), PackageDefinition>> {
    Ok(select_active(read_definitions(store)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::JobTemplate;

    fn definition(name: &str, version: &str, index: u32) -> PackageDefinition {
        PackageDefinition {
            name: name.to_string(),
            version: version.to_string(),
            source_index: index,
            source_name: format!("source-{index}"),
            metadata: Default::default(),
            config_schema: Default::default(),
            job_template: JobTemplate::new("{}"),
        }
    }

    #[test]
    fn test_catalog_key_layout() {
        assert_eq!(catalog_key(0, "redis", "1.0"), "catalog/0/redis/1.0");
        assert_eq!(
            parse_catalog_key("catalog/12/redis/1.0-rc1"),
            Some((12, "redis", "1.0-rc1"))
        );
    }

    #[test]
    fn test_parse_catalog_key_rejects_malformed() {
        assert_eq!(parse_catalog_key("other/0/redis/1.0"), None);
        assert_eq!(parse_catalog_key("catalog/x/redis/1.0"), None);
        assert_eq!(parse_catalog_key("catalog/0/redis"), None);
        assert_eq!(parse_catalog_key("catalog/0//1.0"), None);
    }

    #[test]
    fn test_select_active_lowest_index_wins() {
        let active = select_active([
            definition("redis", "1.0", 1),
            definition("redis", "1.0", 0),
            definition("redis", "1.0", 2),
            definition("redis", "2.0", 2),
        ]);

        assert_eq!(active.len(), 2);
        assert_eq!(active[&("redis".to_string(), "1.0".to_string())].source_index, 0);
        assert_eq!(active[&("redis".to_string(), "2.0".to_string())].source_index, 2);
    }

    #[test]
    fn test_select_active_keeps_first_on_equal_index() {
        let mut first = definition("redis", "1.0", 0);
        first.source_name = "first".to_string();
        let mut second = definition("redis", "1.0", 0);
        second.source_name = "second".to_string();

        let active = select_active([first, second]);
        assert_eq!(
            active[&("redis".to_string(), "1.0".to_string())].source_name,
            "first"
        );
    }

    #[test]
    fn test_service_instance_endpoint() {
        assert_eq!(ServiceInstance::new("10.0.0.1", 8080).endpoint(), "10.0.0.1:8080");
        assert_eq!(ServiceInstance::new("zk.service", 0).endpoint(), "zk.service");
    }
}
