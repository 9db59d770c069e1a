//! Package lookup errors

use super::PkgError;

/// Creates a package not found error
pub fn not_found(name: impl Into<String>) -> PkgError {
    PkgError::PackageNotFound { name: name.into() }
}

/// Creates a version not found error
pub fn version_not_found(name: impl Into<String>, version: impl Into<String>) -> PkgError {
    PkgError::VersionNotFound {
        name: name.into(),
        version: version.into(),
    }
}

/// Creates a not installed error
pub fn not_installed(name: impl Into<String>) -> PkgError {
    PkgError::NotInstalled { name: name.into() }
}
