//! Discovery Resolver
//!
//! Fills in service addresses that were not configured. An explicit address
//! always wins and is returned without touching the registry. Otherwise the
//! registry's catalog is asked once for healthy instances and, when that
//! fails or finds nothing, the static default is used. Missing discovery is
//! not an error.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::registry::{RegistryStore, ServiceInstance};

/// Where a resolved address came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Configured,
    Catalog,
    Default,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Configured => f.write_str("configured"),
            Origin::Catalog => f.write_str("catalog"),
            Origin::Default => f.write_str("default"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryResult {
    pub address: String,
    pub origin: Origin,
}

/// Which healthy instances make up the address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// First instance in catalog order
    First,
    /// Every instance in catalog order, comma-separated
    All,
}

/// How to discover one logical service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookup {
    pub service: &'static str,
    pub tag: Option<&'static str>,
    pub default: &'static str,
    /// Scheme prepended to catalog addresses, e.g. `http`
    pub scheme: Option<&'static str>,
    pub selection: Selection,
}

/// The scheduler
pub const MARATHON: Lookup = Lookup {
    service: "marathon",
    tag: None,
    default: "http://localhost:8080",
    scheme: Some("http"),
    selection: Selection::First,
};

/// The resource manager's current leader
pub const MESOS: Lookup = Lookup {
    service: "mesos",
    tag: Some("leader"),
    default: "http://localhost:5050",
    scheme: Some("http"),
    selection: Selection::First,
};

/// The coordination service ensemble
pub const ZOOKEEPER: Lookup = Lookup {
    service: "zookeeper",
    tag: None,
    default: "localhost:2181",
    scheme: None,
    selection: Selection::All,
};

/// Resolved addresses of every cluster service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAddresses {
    pub marathon: DiscoveryResult,
    pub mesos: DiscoveryResult,
    pub zookeeper: DiscoveryResult,
}

pub struct Resolver {
    registry: Arc<dyn RegistryStore>,
}

fn format_endpoint(instance: &ServiceInstance, scheme: Option<&str>) -> String {
    match scheme {
        Some(scheme) => format!("{scheme}://{}", instance.endpoint()),
        None => instance.endpoint(),
    }
}

impl Resolver {
    pub fn new(registry: Arc<dyn RegistryStore>) -> Self {
        Self { registry }
    }

    /// Resolve `service` with an optional `tag`, falling back to `default`
    pub fn resolve_service(
        &self,
        configured: Option<&str>,
        service: &str,
        tag: Option<&str>,
        default: &str,
    ) -> DiscoveryResult {
        self.resolve_with(configured, service, tag, default, None, Selection::First)
    }

    /// Resolve one of the well-known cluster services
    pub fn resolve(&self, configured: Option<&str>, lookup: &Lookup) -> DiscoveryResult {
        self.resolve_with(
            configured,
            lookup.service,
            lookup.tag,
            lookup.default,
            lookup.scheme,
            lookup.selection,
        )
    }

    fn resolve_with(
        &self,
        configured: Option<&str>,
        service: &str,
        tag: Option<&str>,
        default: &str,
        scheme: Option<&str>,
        selection: Selection,
    ) -> DiscoveryResult {
        if let Some(address) = configured.filter(|a| !a.is_empty()) {
            return DiscoveryResult {
                address: address.to_string(),
                origin: Origin::Configured,
            };
        }

        let fallback = || DiscoveryResult {
            address: default.to_string(),
            origin: Origin::Default,
        };

        let instances = match self.registry.catalog_lookup(service, tag) {
            Ok(instances) => instances,
            Err(e) => {
                warn!(service, error = %e, default, "Catalog lookup failed, using default");
                return fallback();
            }
        };

        let address = match selection {
            Selection::First => instances.first().map(|i| format_endpoint(i, scheme)),
            Selection::All if instances.is_empty() => None,
            Selection::All => Some(
                instances
                    .iter()
                    .map(|i| format_endpoint(i, scheme))
                    .collect::<Vec<_>>()
                    .join(","),
            ),
        };

        match address {
            Some(address) => {
                debug!(service, ?tag, %address, "Discovered service in catalog");
                DiscoveryResult {
                    address,
                    origin: Origin::Catalog,
                }
            }
            None => {
                debug!(service, ?tag, default, "No healthy instances, using default");
                fallback()
            }
        }
    }

    /// Resolve the scheduler, resource manager and coordination service
    pub fn resolve_cluster(
        &self,
        marathon: Option<&str>,
        mesos: Option<&str>,
        zookeeper: Option<&str>,
    ) -> ClusterAddresses {
        let addresses = ClusterAddresses {
            marathon: self.resolve(marathon, &MARATHON),
            mesos: self.resolve(mesos, &MESOS),
            zookeeper: self.resolve(zookeeper, &ZOOKEEPER),
        };
        for (name, result) in [
            ("marathon", &addresses.marathon),
            ("mesos", &addresses.mesos),
            ("zookeeper", &addresses.zookeeper),
        ] {
            info!(service = name, address = %result.address, origin = %result.origin, "Resolved service");
        }
        addresses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::MemoryRegistry;

    fn resolver() -> (Resolver, Arc<MemoryRegistry>) {
        let registry = Arc::new(MemoryRegistry::new());
        (Resolver::new(registry.clone()), registry)
    }

    #[test]
    fn test_configured_address_skips_catalog() {
        let (resolver, registry) = resolver();
        let result = resolver.resolve(Some("http://marathon.example:8080"), &MARATHON);

        assert_eq!(result.address, "http://marathon.example:8080");
        assert_eq!(result.origin, Origin::Configured);
        assert_eq!(registry.lookup_count(), 0);
    }

    #[test]
    fn test_empty_configured_address_is_unset() {
        let (resolver, registry) = resolver();
        let result = resolver.resolve(Some(""), &MARATHON);
        assert_eq!(result.origin, Origin::Default);
        assert_eq!(registry.lookup_count(), 1);
    }

    #[test]
    fn test_catalog_first_instance_with_scheme() {
        let (resolver, registry) = resolver();
        registry.register_service("marathon", &[], ServiceInstance::new("10.0.0.1", 8080));
        registry.register_service("marathon", &[], ServiceInstance::new("10.0.0.2", 8080));

        let result = resolver.resolve(None, &MARATHON);
        assert_eq!(result.address, "http://10.0.0.1:8080");
        assert_eq!(result.origin, Origin::Catalog);
    }

    #[test]
    fn test_tag_filters_to_leader() {
        let (resolver, registry) = resolver();
        registry.register_service("mesos", &["follower"], ServiceInstance::new("10.0.0.1", 5050));
        registry.register_service("mesos", &["leader"], ServiceInstance::new("10.0.0.3", 5050));

        let result = resolver.resolve(None, &MESOS);
        assert_eq!(result.address, "http://10.0.0.3:5050");
    }

    #[test]
    fn test_zookeeper_joins_all_instances() {
        let (resolver, registry) = resolver();
        registry.register_service("zookeeper", &[], ServiceInstance::new("zk1", 2181));
        registry.register_service("zookeeper", &[], ServiceInstance::new("zk2", 2181));

        let result = resolver.resolve(None, &ZOOKEEPER);
        assert_eq!(result.address, "zk1:2181,zk2:2181");
    }

    #[test]
    fn test_no_instances_falls_back_to_default() {
        let (resolver, registry) = resolver();
        let result = resolver.resolve(None, &MESOS);

        assert_eq!(result.address, "http://localhost:5050");
        assert_eq!(result.origin, Origin::Default);
        assert_eq!(registry.lookup_count(), 1);
    }

    #[test]
    fn test_lookup_failure_falls_back_after_one_attempt() {
        let (resolver, registry) = resolver();
        registry.set_unavailable(true);

        let result = resolver.resolve_service(None, "marathon", None, "http://fallback:8080");
        assert_eq!(result.address, "http://fallback:8080");
        assert_eq!(result.origin, Origin::Default);
        assert_eq!(registry.lookup_count(), 1);
    }

    #[test]
    fn test_resolve_cluster() {
        let (resolver, registry) = resolver();
        registry.register_service("zookeeper", &[], ServiceInstance::new("zk1", 2181));

        let cluster = resolver.resolve_cluster(Some("http://m:8080"), None, None);
        assert_eq!(cluster.marathon.origin, Origin::Configured);
        assert_eq!(cluster.mesos.address, "http://localhost:5050");
        assert_eq!(cluster.zookeeper.address, "zk1:2181");
        assert_eq!(registry.lookup_count(), 2);
    }
}
