//! Sync command: one synchronization of the configured package sources

use super::helpers::{connect_registry, sync_summary};
use crate::cache::SourceCache;
use crate::cli::SyncArgs;
use crate::config::Settings;
use crate::error::Result;
use crate::sync::Synchronizer;

/// Run sync command. Fails when the registry is unreachable or every
/// source failed.
pub fn run(settings: &Settings, args: &SyncArgs) -> Result<()> {
    let registry = connect_registry(settings)?;
    let synchronizer = Synchronizer::new(registry, SourceCache::new(&settings.cache_dir));

    let result = synchronizer.sync(&settings.sources, args.force)?;
    for line in sync_summary(&result) {
        println!("{line}");
    }

    Ok(())
}
