//! Test doubles and fixtures for pkgplane's collaborators.
//!
//! Compiled for unit tests and, through the `testkit` feature, for the
//! integration tests under `tests/`.
//!
//! - [`MemoryRegistry`]: in-memory Registry Store with call counters
//! - [`RecordingScheduler`]: scheduler that records every call
//! - [`CatalogRepo`]: throw-away git repository in the universe layout
//! - [`http::TestServer`]: axum router served on `127.0.0.1:0`
//!
//! # Panics
//!
//! Helpers here panic on setup failures; they are only meant for tests.

mod catalog;
pub mod http;
mod registry;
mod scheduler;

pub use catalog::CatalogRepo;
pub use registry::MemoryRegistry;
pub use scheduler::RecordingScheduler;
