//! Scheduler errors

use super::PkgError;

/// Creates a scheduler unavailable error
pub fn unavailable(reason: impl Into<String>) -> PkgError {
    PkgError::SchedulerUnavailable {
        reason: reason.into(),
    }
}

/// Creates a scheduler request failed error
pub fn request_failed(status: u16, body: impl Into<String>) -> PkgError {
    PkgError::SchedulerRequestFailed {
        status,
        body: body.into(),
    }
}
