//! Command implementations for the pkgplane CLI

pub mod cache;
pub mod completions;
pub mod helpers;
pub mod serve;
pub mod sync;
pub mod version;
