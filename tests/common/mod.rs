//! Common test utilities for pkgplane integration tests

use std::sync::Arc;

use pkgplane::cache::SourceCache;
use pkgplane::catalog::ClusterContext;
use pkgplane::operations::Orchestrator;
use pkgplane::source::PackageSource;
use pkgplane::sync::Synchronizer;
use pkgplane::testkit::{CatalogRepo, MemoryRegistry, RecordingScheduler};
use serde_json::{Value, json};
use tempfile::TempDir;

/// Job template used by every fixture package
pub const REDIS_TEMPLATE: &str = r#"{
  "id": "/{{name}}",
  "instances": 1,
  "mem": {{memory}},
  "env": {"ZK": "{{cluster.zookeeper}}"}
}"#;

/// Install options schema requiring `memory`
pub fn redis_config() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": {"type": "string", "default": "redis"},
            "memory": {"type": "integer", "description": "Memory in MB"}
        },
        "required": ["memory"]
    })
}

/// A committed catalog defining `redis@1.0` with `description`
pub fn redis_catalog(description: &str) -> CatalogRepo {
    let repo = CatalogRepo::new();
    repo.add_package("redis", "1.0", description, Some(&redis_config()), REDIS_TEMPLATE);
    repo.commit("Add redis");
    repo
}

pub fn cluster() -> ClusterContext {
    ClusterContext {
        marathon: "http://marathon.service.consul:8080".to_string(),
        mesos: "http://leader.mesos.service.consul:5050".to_string(),
        zookeeper: "zookeeper.service.consul:2181".to_string(),
        principal: None,
        secret: None,
    }
}

/// An orchestrator over in-memory collaborators and real git catalogs
#[allow(dead_code)]
pub struct Harness {
    pub orchestrator: Orchestrator,
    pub registry: Arc<MemoryRegistry>,
    pub scheduler: Arc<RecordingScheduler>,
    pub cache: TempDir,
}

impl Harness {
    pub fn new(sources: Vec<PackageSource>) -> Self {
        let cache = TempDir::new().expect("Failed to create cache directory");
        let registry = Arc::new(MemoryRegistry::new());
        let scheduler = Arc::new(RecordingScheduler::new());
        let synchronizer = Synchronizer::new(registry.clone(), SourceCache::new(cache.path()));
        let orchestrator = Orchestrator::new(
            registry.clone(),
            scheduler.clone(),
            synchronizer,
            sources,
            cluster(),
        );
        Self {
            orchestrator,
            registry,
            scheduler,
            cache,
        }
    }
}
