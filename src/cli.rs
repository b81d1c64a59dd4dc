use clap::{Parser, Subcommand};

use tether::Platform;

/// Tether - incremental prepare and live sync for mobile projects
#[derive(Parser, Debug)]
#[command(name = "tether")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output NDJSON events for CI
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rebuild the per-target output directory incrementally
    Prepare {
        /// Target platform
        #[arg(short, long)]
        platform: Platform,

        /// Prepare a bundled build
        #[arg(long)]
        bundle: bool,

        /// Prepare a release build
        #[arg(long)]
        release: bool,
    },
}
