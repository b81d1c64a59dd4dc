//! Command implementations for the Tether binary.

use anyhow::{Context, Result};

use tether::{prepare_platform, LocalStore, Platform, PrepareOptions, Project};

pub fn cmd_prepare(platform: Platform, bundle: bool, release: bool, json: bool) -> Result<()> {
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let store = LocalStore;
    let project = Project::load(&store, &cwd)?;

    let result = prepare_platform(
        &store,
        &project,
        platform,
        PrepareOptions { bundle, release },
        &mut |event| {
            if json {
                println!("{}", event.to_json());
            } else {
                println!("{}", event.message());
            }
        },
    )?;

    if !json && !result.changes.any() {
        println!("Nothing changed since the last prepare.");
    }
    Ok(())
}
