//! Listing and describing packages

use std::collections::BTreeMap;

use super::Orchestrator;
use crate::catalog::version::compare_versions;
use crate::catalog::{PackageDefinition, PackageSummary};
use crate::error::{self, Result};
use crate::registry;

impl Orchestrator {
    /// Summaries of every package with at least one active definition,
    /// ordered by name
    pub fn packages(&self) -> Result<Vec<PackageSummary>> {
        let active = registry::load_active(self.registry.as_ref())?;

        let mut by_name: BTreeMap<&str, Vec<&PackageDefinition>> = BTreeMap::new();
        for definition in active.values() {
            by_name.entry(definition.name.as_str()).or_default().push(definition);
        }

        Ok(by_name
            .values()
            .filter_map(|definitions| PackageSummary::from_definitions(definitions))
            .collect())
    }

    /// The active definition of `name`: the pinned `version`, or the latest
    pub fn package(&self, name: &str, version: Option<&str>) -> Result<PackageDefinition> {
        let active = registry::load_active(self.registry.as_ref())?;

        let mut candidates = active
            .into_values()
            .filter(|d| d.name == name)
            .peekable();
        if candidates.peek().is_none() {
            return Err(error::package::not_found(name));
        }

        match version {
            Some(version) => candidates
                .find(|d| d.version == version)
                .ok_or_else(|| error::package::version_not_found(name, version)),
            None => candidates
                .max_by(|a, b| compare_versions(&a.version, &b.version))
                .ok_or_else(|| error::package::not_found(name)),
        }
    }
}
