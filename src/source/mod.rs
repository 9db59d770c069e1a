//! Package sources
//!
//! A [`PackageSource`] names a remote catalog, where it lives and its
//! precedence (`index`, lower wins). Sources are immutable values supplied
//! as an ordered list at sync time.
//!
//! The transport is a closed set: [`SourceType`] has one variant per catalog
//! transport and each variant knows how to fetch itself, so a new transport
//! is a new variant plus a match arm.

mod git_source;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Catalog transport
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Version-controlled catalog, synced with clone-or-pull
    #[default]
    Git,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::Git => f.write_str("git"),
        }
    }
}

/// Result of fetching a source: where its catalog tree is on disk
#[derive(Debug, Clone)]
pub struct FetchedCatalog {
    /// Root of the fetched catalog tree
    pub root: PathBuf,
    /// Transport-level revision (the commit SHA for git)
    pub revision: Option<String>,
}

impl SourceType {
    /// Fetch or update `source` into `workdir`.
    ///
    /// `fresh` discards any previous local state before fetching.
    pub fn fetch(&self, source: &PackageSource, workdir: &Path, fresh: bool) -> Result<FetchedCatalog> {
        match self {
            SourceType::Git => git_source::fetch(source, workdir, fresh),
        }
    }
}

/// A prioritized remote package catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSource {
    name: String,
    path: String,
    #[serde(rename = "type", default)]
    source_type: SourceType,
    index: u32,
}

impl PackageSource {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        source_type: SourceType,
        index: u32,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            source_type,
            index,
        }
    }

    /// Shorthand for a git source
    pub fn git(name: impl Into<String>, path: impl Into<String>, index: u32) -> Self {
        Self::new(name, path, SourceType::Git, index)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Catalog location, e.g. a git URL
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    /// Precedence; lower wins
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Fetch this source into `workdir`
    pub fn fetch(&self, workdir: &Path, fresh: bool) -> Result<FetchedCatalog> {
        self.source_type.fetch(self, workdir, fresh)
    }
}

impl fmt::Display for PackageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {}, index {})", self.name, self.source_type, self.path, self.index)
    }
}

/// The catalogs used when none are configured
pub fn default_sources() -> Vec<PackageSource> {
    vec![
        PackageSource::git("mesosphere", "https://github.com/mesosphere/universe.git", 0),
        PackageSource::git("mantl", "https://github.com/CiscoCloud/mantl-universe.git", 1),
        PackageSource::git(
            "mesosphere-multiverse",
            "https://github.com/mesosphere/multiverse.git",
            2,
        ),
    ]
}
