use clap::{Parser, Subcommand};

/// Arguments for cache command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show cache statistics:\n    pkgplane cache\n\n\
                  List cached package sources:\n    pkgplane cache list\n\n\
                  Clear the cache:\n    pkgplane cache clear")]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: Option<CacheSubcommand>,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheSubcommand {
    /// List cached package sources
    List,

    /// Remove every cached package source
    Clear,
}
