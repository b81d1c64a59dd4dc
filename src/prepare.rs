//! The rebuild pipeline: graph → inventory → delta → apply → stamp.

use std::path::Path;

use crate::config::{PrepareOptions, Project};
use crate::delta::rebuild_delta;
use crate::error::TetherResult;
use crate::events::PrepareEvent;
use crate::graph::{build_graph, PackageGraph, ScriptFile};
use crate::inventory::build_inventory;
use crate::manifest::MANIFEST_NAME;
use crate::platform::{Platform, TargetLayout};
use crate::prepare_info::{PrepareInfo, PrepareInfoStore, ProjectChanges};
use crate::store::FileStore;

/// Outcome of preparing one target platform
#[derive(Debug)]
pub struct PrepareResult {
    pub platform: Platform,
    pub changes: ProjectChanges,
    pub prepare_info: PrepareInfo,
}

/// Prepare the requested platform and report what changed. The result
/// always describes the platform that was asked for.
pub fn prepare_platform(
    store: &dyn FileStore,
    project: &Project,
    platform: Platform,
    options: PrepareOptions,
    on_event: &mut dyn FnMut(PrepareEvent),
) -> TetherResult<PrepareResult> {
    on_event(PrepareEvent::PrepareStarted {
        platform: platform.name().to_string(),
    });

    let layout = TargetLayout::for_platform(platform, &project.dir);
    let mut graph = build_graph(store, &project.dir)?;
    build_inventory(store, &project.dir, &mut graph)?;
    let delta = rebuild_delta(store, &project.dir, &graph, platform, &layout, on_event)?;

    let info_store = PrepareInfoStore::new(store, &project.dir, &layout);
    let last_time = info_store
        .read()
        .and_then(|info| info.time.parse::<i64>().ok());

    let mut changes = compute_changes(store, project, platform, &graph, &layout, &delta, last_time);
    let info = info_store.reconcile(&mut changes, options.bundle, options.release);

    delta.apply(store, &project.dir)?;

    // App_Resources and native package files are materialized by the
    // platform toolchain; the engine only tracks their timestamps.
    let prepare_info = info_store.commit(info, &changes)?;

    on_event(PrepareEvent::PrepareFinished {
        platform: platform.name().to_string(),
        copied: delta.copy.len(),
        removed: delta.rmfile.len(),
    });

    Ok(PrepareResult {
        platform,
        changes,
        prepare_info,
    })
}

fn compute_changes(
    store: &dyn FileStore,
    project: &Project,
    platform: Platform,
    graph: &PackageGraph,
    layout: &TargetLayout,
    delta: &crate::delta::Delta,
    last_time: Option<i64>,
) -> ProjectChanges {
    let mut changes = ProjectChanges::default();

    let modules_prefix = format!("{}/", layout.modules);
    for path in delta.copy.keys().chain(delta.rmfile.iter()) {
        if path.starts_with(&modules_prefix) {
            changes.modules_changed = true;
        } else {
            changes.app_files_changed = true;
        }
    }

    changes.app_resources_changed = newer_than(
        graph.app().native_files.get(&platform).into_iter().flatten(),
        last_time,
    );
    changes.native_changed = graph
        .available_dependencies()
        .any(|(_, pack)| newer_than(pack.native_files.get(&platform).into_iter().flatten(), last_time));
    changes.package_changed = manifest_newer_than(store, &project.dir, last_time);

    changes
}

fn newer_than<'a>(files: impl Iterator<Item = &'a ScriptFile>, since: Option<i64>) -> bool {
    match since {
        Some(t) => {
            let mut files = files;
            files.any(|f| f.mtime_ms > t)
        }
        // Never prepared: reconciliation forces every flag anyway.
        None => false,
    }
}

fn manifest_newer_than(store: &dyn FileStore, project_dir: &Path, since: Option<i64>) -> bool {
    let Some(t) = since else { return false };
    store
        .mtime_ms(&project_dir.join(MANIFEST_NAME))
        .map(|m| m > t)
        .unwrap_or(false)
}
