//! Registry store errors

use super::PkgError;

/// Creates a registry unavailable error
pub fn unavailable(reason: impl Into<String>) -> PkgError {
    PkgError::RegistryUnavailable {
        reason: reason.into(),
    }
}

/// Creates a registry request failed error
pub fn request_failed(status: u16, body: impl Into<String>) -> PkgError {
    PkgError::RegistryRequestFailed {
        status,
        body: body.into(),
    }
}

/// Creates a corrupt registry entry error
pub fn corrupt_entry(key: impl Into<String>, reason: impl Into<String>) -> PkgError {
    PkgError::RegistryEntryCorrupt {
        key: key.into(),
        reason: reason.into(),
    }
}
