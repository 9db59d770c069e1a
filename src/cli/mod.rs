//! CLI definitions using clap derive API
//!
//! Argument types live in one submodule per command:
//! - serve: Serve command arguments (also accepted without a subcommand)
//! - sync: Sync command arguments
//! - cache: Cache command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod cache;
pub mod completions;
pub mod serve;
pub mod sync;

pub use cache::{CacheArgs, CacheSubcommand};
pub use completions::CompletionsArgs;
pub use serve::ServeArgs;
pub use sync::SyncArgs;

/// pkgplane - package control plane for Marathon/Mesos clusters
#[derive(Parser, Debug)]
#[command(
    name = "pkgplane",
    author,
    version,
    args_conflicts_with_subcommands = true,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Package control plane for Marathon/Mesos clusters",
    long_about = "pkgplane synchronizes package catalogs from git repositories into Consul, \
                  and installs and uninstalls packages on Marathon through an HTTP API.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  pkgplane                                  \x1b[90m# Serve the API on 0.0.0.0:4001\x1b[0m\n   \
                  pkgplane serve --marathon http://m:8080   \x1b[90m# Serve with a fixed Marathon\x1b[0m\n   \
                  pkgplane sync --force                     \x1b[90m# Re-parse every package source\x1b[0m\n   \
                  pkgplane cache list                       \x1b[90m# List cached package sources\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Serve flags, used when no subcommand is given
    #[command(flatten)]
    pub serve: ServeArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Flags shared by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "PKGPLANE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, global = true, env = "PKGPLANE_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Consul agent address
    #[arg(
        long,
        global = true,
        env = "PKGPLANE_CONSUL",
        default_value = "http://localhost:8500"
    )]
    pub consul: String,

    /// YAML file defining package sources and the registry root
    #[arg(long, global = true, env = "PKGPLANE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for fetched catalogs (defaults to the user cache directory)
    #[arg(long, global = true, env = "PKGPLANE_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Timeout in seconds for each Consul and Marathon request
    #[arg(
        long,
        global = true,
        env = "PKGPLANE_REQUEST_TIMEOUT_SECS",
        default_value_t = 10
    )]
    pub request_timeout_secs: u64,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the HTTP API (the default)
    Serve(ServeArgs),

    /// Synchronize package sources into the registry once
    Sync(SyncArgs),

    /// Manage the local catalog cache
    #[command(name = "cache")]
    Cache(CacheArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
