//! Locating and uninstalling installed packages
//!
//! Whether a package is installed is decided by the scheduler alone: a job
//! carrying the package's labels is an installation.

use tracing::info;

use super::{Orchestrator, PackageRequest};
use crate::error::Result;
use crate::scheduler::{DeleteOutcome, InstalledApp};

impl Orchestrator {
    /// The running job installed from `request.name` (and `request.version`
    /// when given), if any
    pub fn find_installed(&self, request: &PackageRequest) -> Result<Option<InstalledApp>> {
        let apps = self.scheduler.list_apps()?;
        Ok(apps
            .into_iter()
            .find(|app| app.is_instance_of(&request.name, request.version.as_deref())))
    }

    /// Delete `app` from the scheduler. A job the scheduler no longer knows
    /// counts as uninstalled.
    pub fn uninstall_package(&self, app: &InstalledApp) -> Result<DeleteOutcome> {
        let outcome = self.scheduler.delete(&app.id)?;
        match outcome {
            DeleteOutcome::Deleted => info!(app = %app.id, package = ?app.package_name(), "Uninstalled package"),
            DeleteOutcome::AlreadyGone => info!(app = %app.id, "Package was already gone"),
        }
        Ok(outcome)
    }
}
