//! pkgplane - package control plane for Marathon/Mesos clusters

use clap::Parser;

use pkgplane::cli::{Cli, Commands, GlobalArgs, ServeArgs};
use pkgplane::commands;
use pkgplane::config::Settings;
use pkgplane::error::Result;

fn serve(global: &GlobalArgs, args: &ServeArgs) -> Result<()> {
    let settings = Settings::load(global)?;
    settings.logging.init();
    commands::serve::run(&settings, args)
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        None => serve(&cli.global, &cli.serve),
        Some(Commands::Serve(args)) => serve(&cli.global, &args),
        Some(Commands::Sync(args)) => {
            let settings = Settings::load(&cli.global)?;
            settings.logging.init();
            commands::sync::run(&settings, &args)
        }
        Some(Commands::Cache(args)) => commands::cache::run(&Settings::load(&cli.global)?, &args),
        Some(Commands::Version) => commands::version::run(),
        Some(Commands::Completions(args)) => commands::completions::run(&args),
    }
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("{:?}", miette::Report::new(e));
        std::process::exit(1);
    }
}
