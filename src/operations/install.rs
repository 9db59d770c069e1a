//! Installing a package
//!
//! `Received -> Validated -> Submitted -> Acknowledged`. Nothing is
//! persisted between the steps; a failure anywhere fails the call and the
//! caller may retry.

use serde_json::Value;
use tracing::{debug, info};

use super::{Orchestrator, PackageRequest};
use crate::catalog::template::build_context;
use crate::error::Result;
use crate::scheduler::{apply_labels, package_labels};

impl Orchestrator {
    /// Install `request` and return the scheduler's response body as is
    pub fn install_package(&self, request: &PackageRequest) -> Result<String> {
        let definition = self.package(&request.name, request.version.as_deref())?;

        let options = definition
            .config_schema
            .resolve(&definition.name, &request.options)?;
        debug!(
            package = %definition.name,
            version = %definition.version,
            options = options.len(),
            "Validated install options"
        );

        let context = build_context(&options, &self.cluster);
        let mut job = definition
            .job_template
            .render_job(&definition.name, &context)?;
        apply_labels(&mut job, &package_labels(&definition));

        let body = self.scheduler.submit(&Value::Object(job))?;
        info!(
            package = %definition.name,
            version = %definition.version,
            source = %definition.source_name,
            "Installed package"
        );
        Ok(body)
    }
}
