//! Request parsing and option validation errors

use super::PkgError;

/// Creates a request parse failed error
pub fn parse_failed(reason: impl Into<String>) -> PkgError {
    PkgError::RequestParseFailed {
        reason: reason.into(),
    }
}

/// Creates an unknown option error
pub fn unknown_option(package: impl Into<String>, option: impl Into<String>) -> PkgError {
    PkgError::UnknownOption {
        package: package.into(),
        option: option.into(),
    }
}

/// Creates a missing required option error
pub fn missing_option(package: impl Into<String>, option: impl Into<String>) -> PkgError {
    PkgError::MissingOption {
        package: package.into(),
        option: option.into(),
    }
}

/// Creates an invalid option type error
pub fn invalid_option_type(option: impl Into<String>, expected: impl Into<String>) -> PkgError {
    PkgError::InvalidOptionType {
        option: option.into(),
        expected: expected.into(),
    }
}

/// Creates a template render failed error
pub fn render_failed(package: impl Into<String>, reason: impl Into<String>) -> PkgError {
    PkgError::TemplateRenderFailed {
        package: package.into(),
        reason: reason.into(),
    }
}
