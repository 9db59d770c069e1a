//! Error types and handling for pkgplane
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`request`]: Request parsing and option validation errors
//! - [`package`]: Package lookup errors
//! - [`registry`]: Registry store errors
//! - [`scheduler`]: Scheduler errors
//! - [`source`]: Source fetch, catalog parse and sync errors
//! - [`git`]: Git operation errors
//! - [`config`]: Configuration errors
//! - [`fs`]: File system and cache errors
//! - [`server`]: HTTP server errors
//!
//! Every variant is classified into an [`ErrorKind`], which is what the
//! HTTP boundary maps to a status code.

pub mod config;
pub mod fs;
pub mod git;
pub mod package;
pub mod registry;
pub mod request;
pub mod scheduler;
pub mod server;
pub mod source;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for pkgplane operations
#[derive(Error, Diagnostic, Debug)]
pub enum PkgError {
    // Request errors
    #[error("Failed to parse package request: {reason}")]
    #[diagnostic(
        code(pkgplane::request::parse_failed),
        help("The request body must be a JSON object, e.g. {{\"name\": \"redis\", \"options\": {{}}}}")
    )]
    RequestParseFailed { reason: String },

    #[error("Unknown option '{option}' for package '{package}'")]
    #[diagnostic(code(pkgplane::request::unknown_option))]
    UnknownOption { package: String, option: String },

    #[error("Missing required option '{option}' for package '{package}'")]
    #[diagnostic(code(pkgplane::request::missing_option))]
    MissingOption { package: String, option: String },

    #[error("Invalid value for option '{option}': expected {expected}")]
    #[diagnostic(code(pkgplane::request::invalid_option))]
    InvalidOptionType { option: String, expected: String },

    #[error("Failed to render job template for '{package}': {reason}")]
    #[diagnostic(code(pkgplane::request::render_failed))]
    TemplateRenderFailed { package: String, reason: String },

    // Package errors
    #[error("Package '{name}' not found")]
    #[diagnostic(
        code(pkgplane::package::not_found),
        help("Run 'pkgplane sync' to refresh the package catalog")
    )]
    PackageNotFound { name: String },

    #[error("Package '{name}' has no version '{version}'")]
    #[diagnostic(code(pkgplane::package::version_not_found))]
    VersionNotFound { name: String, version: String },

    #[error("Package '{name}' is not installed")]
    #[diagnostic(code(pkgplane::package::not_installed))]
    NotInstalled { name: String },

    // Registry errors
    #[error("Registry store unavailable: {reason}")]
    #[diagnostic(
        code(pkgplane::registry::unavailable),
        help("Check the --consul address and that the agent is reachable")
    )]
    RegistryUnavailable { reason: String },

    #[error("Registry store request failed with status {status}: {body}")]
    #[diagnostic(code(pkgplane::registry::request_failed))]
    RegistryRequestFailed { status: u16, body: String },

    #[error("Corrupt registry entry at '{key}': {reason}")]
    #[diagnostic(code(pkgplane::registry::corrupt_entry))]
    RegistryEntryCorrupt { key: String, reason: String },

    // Scheduler errors
    #[error("Scheduler unavailable: {reason}")]
    #[diagnostic(
        code(pkgplane::scheduler::unavailable),
        help("Check the --marathon address or the scheduler's catalog registration")
    )]
    SchedulerUnavailable { reason: String },

    #[error("Scheduler request failed with status {status}: {body}")]
    #[diagnostic(code(pkgplane::scheduler::request_failed))]
    SchedulerRequestFailed { status: u16, body: String },

    // Source and sync errors
    #[error("Failed to fetch source '{source_name}': {reason}")]
    #[diagnostic(code(pkgplane::source::fetch_failed))]
    SourceFetchFailed { source_name: String, reason: String },

    #[error("Failed to parse catalog at '{path}': {reason}")]
    #[diagnostic(code(pkgplane::source::parse_failed))]
    CatalogParseFailed { path: String, reason: String },

    #[error("All {count} package sources failed to synchronize: {failures}")]
    #[diagnostic(
        code(pkgplane::source::sync_failed),
        help("Previously synchronized packages are still served")
    )]
    SyncFailed { count: usize, failures: String },

    // Git errors
    #[error("Git operation failed: {message}")]
    #[diagnostic(code(pkgplane::git::operation_failed))]
    GitOperationFailed { message: String },

    #[error("Failed to clone repository: {url}: {reason}")]
    #[diagnostic(
        code(pkgplane::git::clone_failed),
        help("Check that URL is correct and you have access to repository")
    )]
    GitCloneFailed { url: String, reason: String },

    #[error("Failed to fetch from remote {url}: {reason}")]
    #[diagnostic(code(pkgplane::git::fetch_failed))]
    GitFetchFailed { url: String, reason: String },

    #[error("Failed to open repository at '{path}': {reason}")]
    #[diagnostic(code(pkgplane::git::open_failed))]
    GitOpenFailed { path: String, reason: String },

    #[error("Failed to resolve git ref '{git_ref}': {reason}")]
    #[diagnostic(code(pkgplane::git::ref_resolve_failed))]
    GitRefResolveFailed { git_ref: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(pkgplane::config::invalid))]
    ConfigInvalid { message: String },

    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(pkgplane::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(pkgplane::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    // File system errors
    #[error("IO error: {message}")]
    #[diagnostic(code(pkgplane::fs::io_error))]
    IoError { message: String },

    #[error("Cache operation failed: {message}")]
    #[diagnostic(code(pkgplane::cache::operation_failed))]
    CacheOperationFailed { message: String },

    // Server errors
    #[error("Failed to listen on {address}: {reason}")]
    #[diagnostic(
        code(pkgplane::server::bind_failed),
        help("Pick another address with --listen")
    )]
    ServerBindFailed { address: String, reason: String },

    #[error("HTTP server failed: {reason}")]
    #[diagnostic(code(pkgplane::server::failed))]
    ServerFailed { reason: String },

    #[error("Request worker failed: {reason}")]
    #[diagnostic(code(pkgplane::server::task_failed))]
    ServerTaskFailed { reason: String },
}

/// Coarse classification of a [`PkgError`], used at the HTTP boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed request body
    Parse,
    /// Options failed schema validation or the template could not be rendered
    Validation,
    /// Unknown package/version, or nothing installed
    NotFound,
    /// Registry store or scheduler transport/status failure
    Upstream,
    /// Package sources failed to fetch or parse
    Sync,
    /// Invalid settings or configuration file
    Config,
    /// Local disk or cache failure
    Internal,
}

impl PkgError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PkgError::RequestParseFailed { .. } => ErrorKind::Parse,
            PkgError::UnknownOption { .. }
            | PkgError::MissingOption { .. }
            | PkgError::InvalidOptionType { .. }
            | PkgError::TemplateRenderFailed { .. } => ErrorKind::Validation,
            PkgError::PackageNotFound { .. }
            | PkgError::VersionNotFound { .. }
            | PkgError::NotInstalled { .. } => ErrorKind::NotFound,
            PkgError::RegistryUnavailable { .. }
            | PkgError::RegistryRequestFailed { .. }
            | PkgError::RegistryEntryCorrupt { .. }
            | PkgError::SchedulerUnavailable { .. }
            | PkgError::SchedulerRequestFailed { .. } => ErrorKind::Upstream,
            PkgError::SourceFetchFailed { .. }
            | PkgError::CatalogParseFailed { .. }
            | PkgError::SyncFailed { .. }
            | PkgError::GitOperationFailed { .. }
            | PkgError::GitCloneFailed { .. }
            | PkgError::GitFetchFailed { .. }
            | PkgError::GitOpenFailed { .. }
            | PkgError::GitRefResolveFailed { .. } => ErrorKind::Sync,
            PkgError::ConfigInvalid { .. }
            | PkgError::ConfigReadFailed { .. }
            | PkgError::ConfigParseFailed { .. } => ErrorKind::Config,
            PkgError::IoError { .. }
            | PkgError::CacheOperationFailed { .. }
            | PkgError::ServerBindFailed { .. }
            | PkgError::ServerFailed { .. }
            | PkgError::ServerTaskFailed { .. } => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<std::io::Error> for PkgError {
    fn from(err: std::io::Error) -> Self {
        PkgError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for PkgError {
    fn from(err: serde_yaml::Error) -> Self {
        PkgError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for PkgError {
    fn from(err: serde_json::Error) -> Self {
        PkgError::CatalogParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<git2::Error> for PkgError {
    fn from(err: git2::Error) -> Self {
        PkgError::GitOperationFailed {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, PkgError>;
