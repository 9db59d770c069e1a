//! Command helper utilities

use std::sync::Arc;

use tracing::info;

use crate::config::Settings;
use crate::error::Result;
use crate::registry::ConsulRegistry;
use crate::sync::SyncResult;

/// Connect to the registry and check that it answers.
///
/// Failing here is fatal: nothing works without the registry.
pub fn connect_registry(settings: &Settings) -> Result<Arc<ConsulRegistry>> {
    let registry = ConsulRegistry::new(
        &settings.consul,
        &settings.registry_root,
        settings.request_timeout,
    )?;
    registry.probe()?;
    info!(consul = %settings.consul, root = %registry.root(), "Connected to registry");
    Ok(Arc::new(registry))
}

/// Human-readable lines describing a sync
pub fn sync_summary(result: &SyncResult) -> Vec<String> {
    let mut lines = vec![format!(
        "Synchronized {} source{} ({} parsed, {} unchanged)",
        result.succeeded.len(),
        if result.succeeded.len() == 1 { "" } else { "s" },
        result.parsed,
        result.reused,
    )];
    lines.push(format!(
        "  Registry entries: {} written, {} unchanged, {} shadowed",
        result.written, result.unchanged, result.shadowed
    ));
    if result.superseded > 0 {
        lines.push(format!(
            "  Superseded by a later catalog revision: {}",
            result.superseded
        ));
    }
    if result.is_partial() {
        lines.push(format!("Failed sources ({}):", result.failed.len()));
        for (name, reason) in &result.failed {
            lines.push(format!("  {name}: {reason}"));
        }
    }
    lines
}
