//! Repository cloning

use std::path::Path;

use git2::{FetchOptions, RemoteCallbacks, Repository, build::RepoBuilder};

use super::auth::setup_auth_callbacks;
use super::error::interpret_git_error;
use super::url::{is_local, normalize_file_url, normalize_ssh_url};
use crate::error::{self, Result};

/// Clone a git repository to a target directory
///
/// Remote repositories are cloned shallow (depth 1); a catalog only ever
/// needs the tip of its default branch. Local paths and file:// URLs do not
/// support shallow clones and are cloned in full.
pub fn clone(url: &str, target: &Path) -> Result<Repository> {
    let mut callbacks = RemoteCallbacks::new();
    setup_auth_callbacks(&mut callbacks);

    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);
    if !is_local(url) {
        fetch_options.depth(1);
    }

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options);

    let url_to_clone = normalize_ssh_url(url);
    let url_to_clone = normalize_file_url(&url_to_clone);
    builder
        .clone(url_to_clone.as_ref(), target)
        .map_err(|e| error::git::clone_failed(url, interpret_git_error(&e)))
}
