//! DeltaPlanner - desired-state computation and reconciliation against
//! the existing output tree.

use std::path::Path;

use crate::events::PrepareEvent;
use crate::graph::PackageGraph;
use crate::platform::{
    dir_chain, has_other_platform_suffix, relative_string, strip_platform_suffix, Platform,
    TargetLayout,
};
use crate::error::TetherResult;
use crate::store::FileStore;

use super::{CopySource, Delta};

/// Desired state: where every app and module file should land for the
/// target, with the scaffold of directories that must exist.
pub fn build_delta(
    graph: &PackageGraph,
    platform: Platform,
    layout: &TargetLayout,
    on_event: &mut dyn FnMut(PrepareEvent),
) -> Delta {
    let mut delta = Delta::default();

    for dir in dir_chain(&layout.app) {
        delta.mkdir.insert(dir);
    }
    for dir in dir_chain(&layout.modules) {
        delta.mkdir.insert(dir);
    }

    let app = graph.app();
    for dir in &app.directories {
        delta.mkdir.insert(format!("{}/{}", layout.app, dir));
    }
    for file in &app.script_files {
        delta.copy.insert(
            format!("{}/{}", layout.app, file.path),
            CopySource {
                absolute_path: file.absolute_path.clone(),
                mtime_ms: file.mtime_ms,
            },
        );
    }

    for (name, pack) in graph.available_dependencies() {
        // Scoped names create one directory level per segment.
        let mut prefix = layout.modules.clone();
        for segment in name.split('/') {
            prefix = format!("{prefix}/{segment}");
            delta.mkdir.insert(format!("{prefix}/"));
        }
        for dir in &pack.directories {
            delta.mkdir.insert(format!("{prefix}/{dir}"));
        }
        for file in &pack.script_files {
            if has_other_platform_suffix(&file.name, platform) {
                continue;
            }
            let target = format!("{prefix}/{}", strip_platform_suffix(&file.path, platform));
            let source = CopySource {
                absolute_path: file.absolute_path.clone(),
                mtime_ms: file.mtime_ms,
            };
            if delta.copy.insert(target.clone(), source).is_some() {
                // Last writer wins; report it rather than fail.
                on_event(PrepareEvent::CopyCollision {
                    target,
                    winner: file.absolute_path.display().to_string(),
                });
            }
        }
    }

    delta
}

/// Reconcile the desired state against what is already on disk:
/// existing directories leave `mkdir` (or join `rmdir` when undesired),
/// up-to-date files drop their `copy`, stray files join `rmfile`.
pub fn rebuild_delta(
    store: &dyn FileStore,
    project_dir: &Path,
    graph: &PackageGraph,
    platform: Platform,
    layout: &TargetLayout,
    on_event: &mut dyn FnMut(PrepareEvent),
) -> TetherResult<Delta> {
    let mut delta = build_delta(graph, platform, layout, on_event);

    // The modules dir normally nests inside the app dir; scan each root
    // exactly once.
    let mut roots = vec![layout.app.clone()];
    if !layout.modules.starts_with(&format!("{}/", layout.app)) {
        roots.push(layout.modules.clone());
    }

    for root_rel in &roots {
        let root = project_dir.join(root_rel);
        for entry in store.walk(&root)? {
            let rel = format!("{}/{}", root_rel, relative_string(&entry.path, &root));
            if entry.is_dir {
                let key = format!("{rel}/");
                if !delta.mkdir.remove(&key) {
                    delta.rmdir.insert(key);
                }
            } else if let Some(source) = delta.copy.get(&rel) {
                // Not older than the source: already current.
                if entry.mtime_ms >= source.mtime_ms {
                    delta.copy.remove(&rel);
                }
            } else {
                delta.rmfile.insert(rel);
            }
        }
    }

    // Scaffold directories above the scan roots may exist already.
    delta
        .mkdir
        .retain(|dir| !store.exists(&project_dir.join(dir.trim_end_matches('/'))));

    Ok(delta)
}
