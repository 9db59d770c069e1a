//! pkgplane - package control plane for Marathon/Mesos clusters
//!
//! Package catalogs live in git repositories ("sources"). pkgplane keeps a
//! merged, precedence-resolved copy of every source in Consul, renders
//! package job templates against validated install options and submits
//! them to Marathon, tagged so that installed packages can be found and
//! removed again.
//!
//! - [`sync`]: Source Synchronizer
//! - [`discovery`]: Discovery Resolver
//! - [`operations`]: Install Orchestrator
//! - [`api`]: HTTP boundary over the orchestrator

pub mod api;
pub mod cache;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod discovery;
pub mod error;
pub mod git;
pub mod hash;
pub mod operations;
pub mod registry;
pub mod scheduler;
pub mod source;
pub mod sync;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
