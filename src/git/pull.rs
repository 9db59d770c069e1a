//! Updating an existing working copy
//!
//! A catalog working copy is never edited locally, so "pull" is a fetch of
//! the checked out branch followed by a hard reset to what was fetched.

use git2::{FetchOptions, RemoteCallbacks, Repository, ResetType, build::CheckoutBuilder};

use super::auth::setup_auth_callbacks;
use super::error::interpret_git_error;
use super::refs::head_branch;
use super::url::{is_local, normalize_file_url, normalize_ssh_url};
use crate::error::{self, Result};

const FETCH_HEAD: &str = "FETCH_HEAD";

/// Fetch the current branch from `url` and reset the working copy onto it
pub fn pull(repo: &Repository, url: &str) -> Result<()> {
    let fetch_err = |reason: String| error::git::fetch_failed(url, reason);

    let refspec = match head_branch(repo)? {
        Some(branch) => format!("refs/heads/{branch}"),
        None => "HEAD".to_string(),
    };

    let mut callbacks = RemoteCallbacks::new();
    setup_auth_callbacks(&mut callbacks);
    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);
    if !is_local(url) {
        fetch_options.depth(1);
    }

    let remote_url = normalize_ssh_url(url);
    let remote_url = normalize_file_url(&remote_url);
    let mut remote = repo
        .remote_anonymous(remote_url.as_ref())
        .map_err(|e| fetch_err(interpret_git_error(&e)))?;
    remote
        .fetch(&[refspec.as_str()], Some(&mut fetch_options), None)
        .map_err(|e| fetch_err(interpret_git_error(&e)))?;

    let fetched = repo
        .find_reference(FETCH_HEAD)
        .and_then(|r| r.peel_to_commit())
        .map_err(|e| fetch_err(e.message().to_string()))?;

    let mut checkout = CheckoutBuilder::new();
    checkout.force().remove_untracked(true);
    repo.reset(fetched.as_object(), ResetType::Hard, Some(&mut checkout))
        .map_err(|e| fetch_err(format!("reset to {} failed: {}", fetched.id(), e.message())))
}
