//! Git transport for package sources

use std::path::Path;

use tracing::debug;

use super::{FetchedCatalog, PackageSource};
use crate::error::{self, Result};
use crate::git;

/// Subdirectory of a source's workdir holding the working copy
const CHECKOUT_DIR: &str = "checkout";

/// Clone or pull the source's repository into `<workdir>/checkout`
pub(super) fn fetch(source: &PackageSource, workdir: &Path, fresh: bool) -> Result<FetchedCatalog> {
    let checkout = workdir.join(CHECKOUT_DIR);

    let revision = git::clone_or_pull(source.path(), &checkout, fresh)
        .map_err(|e| error::source::fetch_failed(source.name(), e.to_string()))?;

    debug!(source = source.name(), %revision, "Fetched git catalog");

    Ok(FetchedCatalog {
        root: checkout,
        revision: Some(revision),
    })
}
