//! Listing of cached sources

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::snapshot::Snapshot;
use crate::error::{self, Result};

/// One cached source directory
#[derive(Debug, Clone)]
pub struct CachedSource {
    /// Directory name (`<index>-<slug>`)
    pub slug: String,
    pub path: PathBuf,
    /// Source name from the snapshot, if one was written
    pub source_name: Option<String>,
    pub revision: Option<String>,
    pub packages: usize,
    /// Total size in bytes
    pub size: u64,
}

impl CachedSource {
    pub fn formatted_size(&self) -> String {
        format_size(self.size)
    }
}

/// Format a byte count as a human-readable string
pub fn format_size(bytes: u64) -> String {
    let size = bytes as f64;
    if size < 1024.0 {
        format!("{} B", bytes)
    } else if size < 1024.0 * 1024.0 {
        format!("{:.1} KB", size / 1024.0)
    } else if size < 1024.0 * 1024.0 * 1024.0 {
        format!("{:.1} MB", size / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", size / (1024.0 * 1024.0 * 1024.0))
    }
}

fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

pub(super) fn list_sources(sources_dir: &Path, snapshot_file: &str) -> Result<Vec<CachedSource>> {
    if !sources_dir.is_dir() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(sources_dir).map_err(|e| {
        error::fs::cache_operation_failed(format!(
            "Failed to read {}: {}",
            sources_dir.display(),
            e
        ))
    })?;

    let mut sources: Vec<CachedSource> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .map(|path| {
            let snapshot = Snapshot::read(&path.join(snapshot_file)).ok();
            CachedSource {
                slug: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                size: dir_size(&path),
                source_name: snapshot.as_ref().map(|s| s.source_name.clone()),
                revision: snapshot.as_ref().and_then(|s| s.revision.clone()),
                packages: snapshot.as_ref().map_or(0, |s| s.definitions.len()),
                path,
            }
        })
        .collect();

    sources.sort_by(|a, b| a.slug.cmp(&b.slug));
    Ok(sources)
}
