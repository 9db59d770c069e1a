//! URL normalization for git operations
//!
//! libgit2 is picky about SCP-style SSH URLs and about file:// URLs without
//! an absolute path, so both are rewritten before being handed to it.

use std::borrow::Cow;
use std::path::Path;

/// True for file:// URLs and filesystem paths, which cannot be cloned shallow
pub fn is_local(url: &str) -> bool {
    url.starts_with("file://") || url.starts_with('/') || Path::new(url).is_absolute()
}

/// Rewrite `git@host:path` to `ssh://git@host/path`
pub fn normalize_ssh_url(url: &str) -> Cow<'_, str> {
    if !url.starts_with("git@") {
        return Cow::Borrowed(url);
    }

    match url.split_once(':') {
        Some((host, path)) => {
            let path = path.strip_prefix('/').unwrap_or(path);
            Cow::Owned(format!("ssh://{host}/{path}"))
        }
        None => Cow::Borrowed(url),
    }
}

/// Rewrite `file://relative` and backslash paths to `file:///...`
pub fn normalize_file_url(url: &str) -> Cow<'_, str> {
    let Some(after) = url.strip_prefix("file://") else {
        return Cow::Borrowed(url);
    };

    if after.contains('\\') {
        let path = after.replace('\\', "/");
        let path = path.trim_start_matches('/');
        return Cow::Owned(format!("file:///{path}"));
    }
    if !after.is_empty() && !after.starts_with('/') {
        return Cow::Owned(format!("file:///{after}"));
    }
    Cow::Borrowed(url)
}
