//! Git operation errors

use super::PkgError;

/// Creates a git clone failed error
pub fn clone_failed(url: impl Into<String>, reason: impl Into<String>) -> PkgError {
    PkgError::GitCloneFailed {
        url: url.into(),
        reason: reason.into(),
    }
}

/// Creates a git fetch failed error
pub fn fetch_failed(url: impl Into<String>, reason: impl Into<String>) -> PkgError {
    PkgError::GitFetchFailed {
        url: url.into(),
        reason: reason.into(),
    }
}

/// Creates a git ref resolution failed error
pub fn ref_resolve_failed(git_ref: impl Into<String>, reason: impl Into<String>) -> PkgError {
    PkgError::GitRefResolveFailed {
        git_ref: git_ref.into(),
        reason: reason.into(),
    }
}

/// Creates a git open failed error
pub fn open_failed(path: impl Into<String>, reason: impl Into<String>) -> PkgError {
    PkgError::GitOpenFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
