//! HTTP server errors

use super::PkgError;

/// Creates a listener bind failed error
pub fn bind_failed(address: impl ToString, reason: impl Into<String>) -> PkgError {
    PkgError::ServerBindFailed {
        address: address.to_string(),
        reason: reason.into(),
    }
}

/// Creates a server failed error
pub fn failed(reason: impl Into<String>) -> PkgError {
    PkgError::ServerFailed {
        reason: reason.into(),
    }
}

/// Creates a request worker failed error
pub fn task_failed(reason: impl Into<String>) -> PkgError {
    PkgError::ServerTaskFailed {
        reason: reason.into(),
    }
}
