//! File system and cache errors

use super::PkgError;

/// Creates an IO error
pub fn io_error(message: impl Into<String>) -> PkgError {
    PkgError::IoError {
        message: message.into(),
    }
}

/// Creates a cache operation failed error
pub fn cache_operation_failed(message: impl Into<String>) -> PkgError {
    PkgError::CacheOperationFailed {
        message: message.into(),
    }
}
