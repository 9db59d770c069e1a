//! Local state of package sources
//!
//! Every source gets a working directory holding its fetched catalog and a
//! snapshot of the last successful parse, so that an unchanged catalog is
//! not parsed again.
//!
//! ## Cache Structure
//!
//! ```text
//! <cache_dir>/
//! └── sources/
//!     └── <index>-<name>-<url-slug>/
//!         ├── checkout/        (catalog working copy)
//!         └── snapshot.json    (fingerprint, revision, parsed definitions)
//! ```

mod snapshot;
mod stats;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

pub use snapshot::Snapshot;
pub use stats::{CachedSource, format_size};

use crate::error::{self, Result};
use crate::source::PackageSource;

/// Default cache directory name under the user's cache directory
const CACHE_DIR: &str = "pkgplane";

/// Sources subdirectory within the cache
const SOURCES_DIR: &str = "sources";

/// Snapshot file within a source's working directory
const SNAPSHOT_FILE: &str = "snapshot.json";

/// Get the default cache directory path
///
/// Returns `~/.cache/pkgplane` on Unix or the equivalent on other platforms.
pub fn default_cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir()
        .ok_or_else(|| error::fs::cache_operation_failed("Could not determine cache directory"))?;

    Ok(base.join(CACHE_DIR))
}

/// Generate a cache key (URL slug) from a catalog location
///
/// Example: "https://github.com/mesosphere/universe.git" -> "github.com-mesosphere-universe"
pub fn url_to_slug(url: &str) -> String {
    url.replace("https://", "")
        .replace("http://", "")
        .replace("file://", "")
        .replace("git@", "")
        .replace([':', '/', '\\'], "-")
        .replace(".git", "")
        .trim_matches('-')
        .to_string()
}

/// Per-source working directories and snapshots under one cache root
#[derive(Debug, Clone)]
pub struct SourceCache {
    root: PathBuf,
}

impl SourceCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn sources_dir(&self) -> PathBuf {
        self.root.join(SOURCES_DIR)
    }

    /// Working directory for `source`: `<root>/sources/<index>-<name>-<slug>`
    pub fn workdir(&self, source: &PackageSource) -> PathBuf {
        self.sources_dir().join(format!(
            "{}-{}-{}",
            source.index(),
            url_to_slug(source.name()),
            url_to_slug(source.path())
        ))
    }

    /// Read the snapshot of the last successful parse of `source`.
    ///
    /// A missing snapshot is `None`. An unreadable one is logged and
    /// treated as missing so that the source is parsed again.
    pub fn load_snapshot(&self, source: &PackageSource) -> Option<Snapshot> {
        let path = self.workdir(source).join(SNAPSHOT_FILE);
        if !path.is_file() {
            return None;
        }

        match Snapshot::read(&path) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(source = %source.name(), error = %e, "Ignoring unreadable snapshot");
                None
            }
        }
    }

    /// Persist the snapshot of `source`
    pub fn store_snapshot(&self, source: &PackageSource, snapshot: &Snapshot) -> Result<()> {
        let workdir = self.workdir(source);
        fs::create_dir_all(&workdir).map_err(|e| {
            error::fs::cache_operation_failed(format!(
                "Failed to create {}: {}",
                workdir.display(),
                e
            ))
        })?;
        snapshot.write(&workdir.join(SNAPSHOT_FILE))?;
        debug!(source = %source.name(), fingerprint = %snapshot.fingerprint, "Stored snapshot");
        Ok(())
    }

    /// List the cached source directories
    pub fn entries(&self) -> Result<Vec<CachedSource>> {
        stats::list_sources(&self.sources_dir(), SNAPSHOT_FILE)
    }

    /// Remove every cached source
    pub fn clear(&self) -> Result<()> {
        let dir = self.sources_dir();
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(|e| {
                error::fs::cache_operation_failed(format!(
                    "Failed to remove {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}
