//! Git operations for keeping catalog working copies up to date
//!
//! This module handles:
//! - Cloning catalog repositories (HTTPS, SSH and local paths)
//! - Pulling updates into an existing working copy (fetch + hard reset)
//! - Resolving the checked out revision
//!
//! Authentication is delegated entirely to git's native system:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Environment variables (`GIT_SSH_COMMAND`, etc.)

mod auth;
mod clone;
mod error;
mod pull;
mod refs;
mod url;

use std::fs;
use std::path::Path;

use tracing::debug;

pub use clone::clone;
pub use pull::pull;
pub use refs::{head_branch, head_revision};

use crate::error::Result;

/// Open an existing repository
pub fn open(path: &Path) -> Result<git2::Repository> {
    git2::Repository::open(path)
        .map_err(|e| crate::error::git::open_failed(path.display().to_string(), e.message()))
}

/// Bring the working copy at `checkout` up to date with `url`.
///
/// Clones when there is no usable working copy, otherwise pulls. With
/// `fresh` set the existing working copy is discarded and cloned again.
/// Returns the checked out commit SHA.
pub fn clone_or_pull(url: &str, checkout: &Path, fresh: bool) -> Result<String> {
    if fresh && checkout.exists() {
        debug!(path = %checkout.display(), "Discarding working copy");
        fs::remove_dir_all(checkout).map_err(|e| {
            crate::error::fs::cache_operation_failed(format!(
                "Failed to remove working copy {}: {}",
                checkout.display(),
                e
            ))
        })?;
    }

    let repo = match open(checkout) {
        Ok(repo) => {
            debug!(url, path = %checkout.display(), "Pulling working copy");
            pull(&repo, url)?;
            repo
        }
        Err(_) => {
            if checkout.exists() {
                // Leftover from an interrupted clone
                fs::remove_dir_all(checkout)?;
            }
            if let Some(parent) = checkout.parent() {
                fs::create_dir_all(parent)?;
            }
            debug!(url, path = %checkout.display(), "Cloning catalog");
            clone(url, checkout)?
        }
    };

    head_revision(&repo)
}
