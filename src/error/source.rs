//! Source fetch, catalog parse and sync errors

use super::PkgError;

/// Creates a source fetch failed error
pub fn fetch_failed(source_name: impl Into<String>, reason: impl Into<String>) -> PkgError {
    PkgError::SourceFetchFailed {
        source_name: source_name.into(),
        reason: reason.into(),
    }
}

/// Creates a catalog parse failed error
pub fn catalog_parse_failed(path: impl Into<String>, reason: impl Into<String>) -> PkgError {
    PkgError::CatalogParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an error for a sync in which every source failed
pub fn sync_failed(count: usize, failures: impl Into<String>) -> PkgError {
    PkgError::SyncFailed {
        count,
        failures: failures.into(),
    }
}
