//! Serve command: bootstrap the control plane and serve the HTTP API
//!
//! Startup order: registry connection (fatal on failure), discovery of the
//! cluster services, scheduler client, initial sync (failures are logged and
//! the previously synced catalog is served), listener.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::helpers::{connect_registry, sync_summary};
use crate::api::HttpServer;
use crate::cache::SourceCache;
use crate::catalog::ClusterContext;
use crate::cli::ServeArgs;
use crate::config::Settings;
use crate::discovery::Resolver;
use crate::error::{self, Result};
use crate::operations::Orchestrator;
use crate::scheduler::MarathonScheduler;
use crate::scheduler::marathon::Credentials;
use crate::sync::Synchronizer;

pub fn run(settings: &Settings, args: &ServeArgs) -> Result<()> {
    let registry = connect_registry(settings)?;

    let addresses = Resolver::new(registry.clone()).resolve_cluster(
        args.marathon.as_deref(),
        args.mesos.as_deref(),
        args.zookeeper.as_deref(),
    );

    let credentials = args.marathon_user.clone().map(|user| Credentials {
        user,
        password: args.marathon_password.clone(),
    });
    if args.marathon_no_verify_ssl {
        warn!("TLS certificate verification is disabled for Marathon");
    }
    let scheduler = MarathonScheduler::new(
        &addresses.marathon.address,
        credentials,
        args.marathon_no_verify_ssl,
        settings.request_timeout,
    )?;

    let cluster = ClusterContext {
        marathon: addresses.marathon.address,
        mesos: addresses.mesos.address,
        zookeeper: addresses.zookeeper.address,
        principal: args.mesos_principal.clone(),
        secret: args.mesos_secret.clone(),
    };

    let synchronizer = Synchronizer::new(registry.clone(), SourceCache::new(&settings.cache_dir));
    let orchestrator = Arc::new(Orchestrator::new(
        registry,
        Arc::new(scheduler),
        synchronizer,
        settings.sources.clone(),
        cluster,
    ));

    match orchestrator.sync(args.force_sync) {
        Ok(result) => {
            for line in sync_summary(&result) {
                info!("{line}");
            }
        }
        Err(e) => error!(error = %e, "Initial sync failed, serving the last synced catalog"),
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| error::server::failed(format!("Failed to start runtime: {e}")))?;

    // The blocking HTTP clients must be dropped outside the runtime, so the
    // last orchestrator reference stays here.
    let server = HttpServer::new(Arc::clone(&orchestrator));
    let result = runtime.block_on(server.start(args.listen, shutdown_signal()));
    drop(runtime);
    drop(orchestrator);
    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
