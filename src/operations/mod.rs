//! Install Orchestrator
//!
//! The façade the boundary layer talks to. It composes the registry, the
//! scheduler and the synchronizer:
//! - Listing and describing packages ([`list`])
//! - Installing a package ([`install`])
//! - Locating and uninstalling installed packages ([`uninstall`])
//! - On-demand synchronization of the package sources
//!
//! The orchestrator keeps no mutable state of its own; every call reads or
//! writes the registry and the scheduler, so it can serve calls from any
//! number of threads at once.

pub mod install;
pub mod list;
pub mod request;
pub mod uninstall;

use std::sync::Arc;

pub use request::PackageRequest;

use crate::catalog::ClusterContext;
use crate::error::Result;
use crate::registry::RegistryStore;
use crate::scheduler::Scheduler;
use crate::source::PackageSource;
use crate::sync::{SyncResult, Synchronizer};

pub struct Orchestrator {
    registry: Arc<dyn RegistryStore>,
    scheduler: Arc<dyn Scheduler>,
    synchronizer: Synchronizer,
    sources: Vec<PackageSource>,
    cluster: ClusterContext,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<dyn RegistryStore>,
        scheduler: Arc<dyn Scheduler>,
        synchronizer: Synchronizer,
        sources: Vec<PackageSource>,
        cluster: ClusterContext,
    ) -> Self {
        Self {
            registry,
            scheduler,
            synchronizer,
            sources,
            cluster,
        }
    }

    /// The configured package sources, in precedence order as supplied
    pub fn sources(&self) -> &[PackageSource] {
        &self.sources
    }

    pub fn cluster(&self) -> &ClusterContext {
        &self.cluster
    }

    /// Synchronize the configured sources into the registry
    pub fn sync(&self, force: bool) -> Result<SyncResult> {
        self.synchronizer.sync(&self.sources, force)
    }
}
