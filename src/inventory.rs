//! FileInventory - enumerate application and package files with their
//! modification times.
//!
//! The app tree is listed minus `app/App_Resources`; each dependency is
//! listed within its own scope, skipping `node_modules` and (for
//! framework packages) `platforms`. A subdirectory carrying its own
//! `package.json` opens a nested scope.

use std::path::{Path, PathBuf};

use crate::error::TetherResult;
use crate::graph::{Availability, Package, PackageGraph, PackageId, PackageKind, ScriptFile};
use crate::manifest::{Manifest, MANIFEST_NAME};
use crate::platform::{
    relative_string, Platform, APP_DIR_NAME, APP_RESOURCES_DIR_NAME, NODE_MODULES_DIR_NAME,
    PLATFORMS_DIR_NAME,
};
use crate::store::{FileStore, WalkedEntry};

/// Populate `graph` with script files, native files, and directories.
pub fn build_inventory(
    store: &dyn FileStore,
    project_dir: &Path,
    graph: &mut PackageGraph,
) -> TetherResult<()> {
    collect_app_files(store, project_dir, graph)?;
    collect_app_resources(store, project_dir, graph)?;

    // Nested packages spawned below extend the worklist.
    let mut queue: Vec<PackageId> = graph.dependencies.values().copied().collect();
    let mut index = 0;
    while index < queue.len() {
        let id = queue[index];
        index += 1;
        let package = graph.get(id);
        if package.kind == PackageKind::App || package.availability != Availability::Available {
            continue;
        }
        let spawned = collect_package_files(store, project_dir, graph, id)?;
        collect_package_native_files(store, project_dir, graph, id)?;
        queue.extend(spawned);
    }
    Ok(())
}

fn script_file(entry: &WalkedEntry, rel: String) -> ScriptFile {
    let name = entry
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = entry
        .path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();
    ScriptFile {
        path: rel,
        absolute_path: entry.path.clone(),
        name,
        extension,
        mtime_ms: entry.mtime_ms,
    }
}

fn collect_app_files(
    store: &dyn FileStore,
    project_dir: &Path,
    graph: &mut PackageGraph,
) -> TetherResult<()> {
    let app_root = project_dir.join(APP_DIR_NAME);
    let excluded = app_root.join(APP_RESOURCES_DIR_NAME);
    for entry in store.walk(&app_root)? {
        if entry.path.starts_with(&excluded) {
            continue;
        }
        let rel = relative_string(&entry.path, &app_root);
        let app = graph.app_mut();
        if entry.is_dir {
            app.directories.push(format!("{rel}/"));
        } else {
            app.script_files.push(script_file(&entry, rel));
        }
    }
    Ok(())
}

fn collect_app_resources(
    store: &dyn FileStore,
    project_dir: &Path,
    graph: &mut PackageGraph,
) -> TetherResult<()> {
    let resources_root = project_dir.join(APP_DIR_NAME).join(APP_RESOURCES_DIR_NAME);
    for platform in Platform::ALL {
        let root = resources_root.join(platform.name());
        let mut files = Vec::new();
        for entry in store.walk(&root)? {
            if !entry.is_dir {
                let rel = relative_string(&entry.path, &root);
                files.push(script_file(&entry, rel));
            }
        }
        if !files.is_empty() {
            graph.app_mut().native_files.insert(platform, files);
        }
    }
    Ok(())
}

struct Scope {
    root: PathBuf,
    id: PackageId,
    skip_platforms: bool,
}

/// Enumerate one package's scope. Returns nested package ids spawned
/// along the way.
fn collect_package_files(
    store: &dyn FileStore,
    project_dir: &Path,
    graph: &mut PackageGraph,
    id: PackageId,
) -> TetherResult<Vec<PackageId>> {
    let pkg_root = project_dir.join(&graph.get(id).path);
    let skip_platforms = graph
        .get(id)
        .manifest
        .as_ref()
        .map(Manifest::supports_platforms)
        .unwrap_or(false);

    let mut scopes = vec![Scope {
        root: pkg_root.clone(),
        id,
        skip_platforms,
    }];
    let mut spawned = Vec::new();

    for entry in store.walk(&pkg_root)? {
        // Ancestor scopes are pushed before any entry inside them, so the
        // last match is the deepest.
        let scope = scopes
            .iter()
            .rev()
            .find(|s| entry.path.starts_with(&s.root))
            .map(|s| (s.root.clone(), s.id, s.skip_platforms));
        let Some((scope_root, scope_id, scope_skip)) = scope else {
            continue;
        };
        let rel = relative_string(&entry.path, &scope_root);
        let first = rel.split('/').next().unwrap_or("");
        if first == NODE_MODULES_DIR_NAME {
            continue;
        }
        if scope_skip && first == PLATFORMS_DIR_NAME {
            continue;
        }

        if entry.is_dir {
            let nested_manifest = entry.path.join(MANIFEST_NAME);
            if store.exists(&nested_manifest) {
                let nested_id = spawn_nested(store, project_dir, graph, scope_id, &entry.path, &nested_manifest)?;
                let nested_skip = graph
                    .get(nested_id)
                    .manifest
                    .as_ref()
                    .map(Manifest::supports_platforms)
                    .unwrap_or(false);
                scopes.push(Scope {
                    root: entry.path.clone(),
                    id: nested_id,
                    skip_platforms: nested_skip,
                });
                spawned.push(nested_id);
                continue;
            }
            graph.get_mut(scope_id).directories.push(format!("{rel}/"));
        } else {
            graph
                .get_mut(scope_id)
                .script_files
                .push(script_file(&entry, rel));
        }
    }

    Ok(spawned)
}

fn spawn_nested(
    store: &dyn FileStore,
    project_dir: &Path,
    graph: &mut PackageGraph,
    parent: PackageId,
    dir: &Path,
    manifest_path: &Path,
) -> TetherResult<PackageId> {
    let manifest = Manifest::load(store, manifest_path)?;
    let name = manifest.name.clone().unwrap_or_else(|| {
        dir.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    let rel_path = dir.strip_prefix(project_dir).unwrap_or(dir).to_path_buf();

    let mut nested = Package::new(PackageKind::Nested, name.clone(), rel_path, "");
    nested.version = manifest.version.clone().unwrap_or_default();
    nested.manifest = Some(manifest);

    if graph.dependencies.contains_key(&name) {
        // Name collision with an already flattened package: the enclosing
        // package is demoted and stops contributing.
        nested.availability = Availability::ShadowedByDiverged;
        let nested_id = graph.push(nested);
        graph.get_mut(parent).children.push(nested_id);
        graph.get_mut(parent).availability = Availability::ShadowedByDiverged;
        Ok(nested_id)
    } else {
        nested.availability = Availability::Available;
        let nested_id = graph.push(nested);
        graph.get_mut(parent).children.push(nested_id);
        graph.dependencies.insert(name, nested_id);
        Ok(nested_id)
    }
}

fn collect_package_native_files(
    store: &dyn FileStore,
    project_dir: &Path,
    graph: &mut PackageGraph,
    id: PackageId,
) -> TetherResult<()> {
    let declared = graph
        .get(id)
        .manifest
        .as_ref()
        .map(Manifest::declared_platforms)
        .unwrap_or_default();
    let pkg_root = project_dir.join(&graph.get(id).path);
    for platform in declared {
        let root = pkg_root.join(PLATFORMS_DIR_NAME).join(platform.name());
        let mut files = Vec::new();
        for entry in store.walk(&root)? {
            if !entry.is_dir {
                let rel = relative_string(&entry.path, &root);
                files.push(script_file(&entry, rel));
            }
        }
        if !files.is_empty() {
            graph.get_mut(id).native_files.insert(platform, files);
        }
    }
    Ok(())
}
