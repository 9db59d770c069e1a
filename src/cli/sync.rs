use clap::Args;

/// Arguments for sync command
#[derive(Args, Debug, Clone)]
#[command(after_help = "EXAMPLES:\n  \
                  Synchronize changed sources:\n    pkgplane sync\n\n\
                  Fetch and parse every source from scratch:\n    pkgplane sync --force")]
pub struct SyncArgs {
    /// Fetch and parse every source even if unchanged
    #[arg(long)]
    pub force: bool,
}
