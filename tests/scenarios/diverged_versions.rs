//! Scenario: two branches install the same dependency at different
//! versions. The higher version wins; the loser contributes no files.

use tempfile::TempDir;

use crate::common::write;

use tether::graph::{build_graph, Availability};
use tether::{prepare_platform, LocalStore, Platform, PrepareOptions, Project};

fn diverged_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "package.json",
        r#"{"version": "1.0.0", "nativescript": {"id": "org.example.app"}, "dependencies": {"left": "1.0.0", "right": "1.0.0"}}"#,
    );
    write(dir.path(), "app/main.js", "main");
    write(
        dir.path(),
        "node_modules/left/package.json",
        r#"{"name": "left", "version": "1.0.0", "dependencies": {"bar": "1.2.0"}}"#,
    );
    write(
        dir.path(),
        "node_modules/left/node_modules/bar/package.json",
        r#"{"name": "bar", "version": "1.2.0"}"#,
    );
    write(dir.path(), "node_modules/left/node_modules/bar/util.js", "v1.2.0");
    write(
        dir.path(),
        "node_modules/right/package.json",
        r#"{"name": "right", "version": "1.0.0", "dependencies": {"bar": "1.1.0"}}"#,
    );
    write(
        dir.path(),
        "node_modules/right/node_modules/bar/package.json",
        r#"{"name": "bar", "version": "1.1.0"}"#,
    );
    write(dir.path(), "node_modules/right/node_modules/bar/util.js", "v1.1.0");
    dir
}

#[test]
fn scenario_diverged_duplicate_resolves_to_higher_version() {
    let dir = diverged_project();
    let graph = build_graph(&LocalStore, dir.path()).unwrap();

    assert_eq!(graph.get(graph.dependencies["bar"]).version, "1.2.0");
    let loser = graph
        .all_packages()
        .find(|p| p.name == "bar" && p.version == "1.1.0")
        .unwrap();
    assert_eq!(loser.availability, Availability::ShadowedByDiverged);
}

#[test]
fn scenario_shadowed_package_contributes_zero_files() {
    let dir = diverged_project();
    let project = Project::load(&LocalStore, dir.path()).unwrap();
    prepare_platform(
        &LocalStore,
        &project,
        Platform::Android,
        PrepareOptions::default(),
        &mut |_| {},
    )
    .unwrap();

    let synced = dir
        .path()
        .join("platforms/android/src/main/assets/app/tns_modules/bar/util.js");
    assert_eq!(std::fs::read_to_string(synced).unwrap(), "v1.2.0");
}
