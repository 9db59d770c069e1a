//! Package definitions and everything derived from a catalog
//!
//! This module handles:
//! - The persisted [`PackageDefinition`] and its listing summary
//! - Configuration schemas and install option validation ([`schema`])
//! - Job template rendering ([`template`])
//! - Version ordering ([`version`])
//! - Parsing a fetched catalog tree into definitions ([`parser`])

pub mod parser;
pub mod schema;
pub mod template;
pub mod version;

use serde::{Deserialize, Serialize};

pub use schema::{ConfigSchema, OptionSpec, OptionType, ResolvedOptions};
pub use template::{ClusterContext, JobTemplate};

/// Descriptive package metadata from `package.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMetadata {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub maintainer: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default)]
    pub framework: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_install_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_install_notes: Option<String>,
}

/// A named, versioned, installable unit as stored in the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDefinition {
    pub name: String,
    pub version: String,
    pub source_index: u32,
    #[serde(default)]
    pub source_name: String,
    #[serde(default)]
    pub metadata: PackageMetadata,
    #[serde(default)]
    pub config_schema: ConfigSchema,
    pub job_template: JobTemplate,
}

impl PackageDefinition {
    /// The `(name, version)` pair identifying this definition
    pub fn key(&self) -> (&str, &str) {
        (&self.name, &self.version)
    }
}

/// One row of the package listing: the active definitions of a name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSummary {
    pub name: String,
    /// Latest active version
    pub version: String,
    /// Every active version, oldest first
    pub versions: Vec<String>,
    pub description: String,
    pub maintainer: String,
    pub source_index: u32,
    pub source_name: String,
}

impl PackageSummary {
    /// Summarize the active definitions of one package name.
    ///
    /// Returns `None` for an empty slice.
    pub fn from_definitions(definitions: &[&PackageDefinition]) -> Option<Self> {
        let latest = definitions
            .iter()
            .max_by(|a, b| version::compare_versions(&a.version, &b.version))?;

        let mut versions: Vec<String> = definitions.iter().map(|d| d.version.clone()).collect();
        versions.sort_by(|a, b| version::compare_versions(a, b));

        Some(Self {
            name: latest.name.clone(),
            version: latest.version.clone(),
            versions,
            description: latest.metadata.description.clone(),
            maintainer: latest.metadata.maintainer.clone(),
            source_index: latest.source_index,
            source_name: latest.source_name.clone(),
        })
    }
}
