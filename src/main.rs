//! Tether CLI - incremental prepare and live sync for mobile projects
//!
//! Usage: tether <COMMAND>

use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Prepare {
            platform,
            bundle,
            release,
        } => commands::cmd_prepare(platform, bundle, release, cli.json),
    };

    if let Err(err) = result {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
