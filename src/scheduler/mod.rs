//! Scheduler contract
//!
//! The scheduler accepts job specs and runs them. The core only submits
//! jobs, lists running ones and deletes them; submission responses are
//! passed through untouched.

pub mod marathon;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use marathon::MarathonScheduler;

use crate::catalog::PackageDefinition;
use crate::error::Result;

/// Label carrying the package name of an installed job
pub const LABEL_PACKAGE_NAME: &str = "PKGPLANE_PACKAGE_NAME";
/// Label carrying the package version of an installed job
pub const LABEL_PACKAGE_VERSION: &str = "PKGPLANE_PACKAGE_VERSION";
/// Label carrying the index of the source the package came from
pub const LABEL_PACKAGE_SOURCE: &str = "PKGPLANE_PACKAGE_SOURCE";

/// A running scheduler job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledApp {
    pub id: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl InstalledApp {
    pub fn new(id: impl Into<String>, labels: BTreeMap<String, String>) -> Self {
        Self {
            id: id.into(),
            labels,
        }
    }

    pub fn package_name(&self) -> Option<&str> {
        self.labels.get(LABEL_PACKAGE_NAME).map(String::as_str)
    }

    pub fn package_version(&self) -> Option<&str> {
        self.labels.get(LABEL_PACKAGE_VERSION).map(String::as_str)
    }

    /// Whether this job was installed from `name` (at `version`, if given)
    pub fn is_instance_of(&self, name: &str, version: Option<&str>) -> bool {
        self.package_name() == Some(name)
            && version.is_none_or(|v| self.package_version() == Some(v))
    }
}

/// Outcome of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The scheduler did not know the job
    AlreadyGone,
}

/// Operations the core needs from the scheduler
pub trait Scheduler: Send + Sync {
    /// Submit a job spec; returns the raw response body
    fn submit(&self, job: &Value) -> Result<String>;

    /// Jobs carrying package labels
    fn list_apps(&self) -> Result<Vec<InstalledApp>>;

    fn delete(&self, app_id: &str) -> Result<DeleteOutcome>;
}

/// Labels identifying the package a job was installed from
pub fn package_labels(definition: &PackageDefinition) -> BTreeMap<String, String> {
    BTreeMap::from([
        (LABEL_PACKAGE_NAME.to_string(), definition.name.clone()),
        (LABEL_PACKAGE_VERSION.to_string(), definition.version.clone()),
        (
            LABEL_PACKAGE_SOURCE.to_string(),
            definition.source_index.to_string(),
        ),
    ])
}

/// Merge `labels` into the job's `labels` object, replacing a non-object
pub fn apply_labels(job: &mut Map<String, Value>, labels: &BTreeMap<String, String>) {
    let slot = job
        .entry("labels")
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(existing) = slot {
        for (key, value) in labels {
            existing.insert(key.clone(), Value::String(value.clone()));
        }
    }
}
