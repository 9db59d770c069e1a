//! Configuration errors

use super::PkgError;

/// Creates an invalid configuration error
pub fn invalid(message: impl Into<String>) -> PkgError {
    PkgError::ConfigInvalid {
        message: message.into(),
    }
}

/// Creates a configuration read failed error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> PkgError {
    PkgError::ConfigReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a configuration parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> PkgError {
    PkgError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
