//! Parsed-catalog snapshots

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::catalog::PackageDefinition;
use crate::error::{self, Result};

/// What a source looked like at its last successful parse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub source_name: String,
    /// Content fingerprint of the catalog tree
    pub fingerprint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    pub definitions: Vec<PackageDefinition>,
}

impl Snapshot {
    pub(super) fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            error::fs::cache_operation_failed(format!(
                "Failed to read snapshot {}: {}",
                path.display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            error::fs::cache_operation_failed(format!(
                "Failed to parse snapshot {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Write via a temp file in the same directory and rename over `path`
    pub(super) fn write(&self, path: &Path) -> Result<()> {
        let write_err = |e: std::io::Error| {
            error::fs::cache_operation_failed(format!(
                "Failed to write snapshot {}: {}",
                path.display(),
                e
            ))
        };

        let content = serde_json::to_vec(self).map_err(|e| {
            error::fs::cache_operation_failed(format!("Failed to serialize snapshot: {}", e))
        })?;

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir).map_err(write_err)?;
        temp.write_all(&content).map_err(write_err)?;
        temp.persist(path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}
