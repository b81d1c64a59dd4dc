//! Depth-first flattening of the installed dependency tree.
//!
//! Shadowing rules, in order:
//! 1. a name resolved two hops up never re-resolves (ancestor shadowing),
//! 2. between diverged branches the higher semver version wins,
//! 3. on a version tie the incumbent keeps its slot.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::TetherResult;
use crate::manifest::{compare_versions, Manifest, MANIFEST_NAME};
use crate::platform::NODE_MODULES_DIR_NAME;
use crate::store::FileStore;

use super::{Availability, Package, PackageGraph, PackageId, PackageKind};

/// Build the flattened dependency map for the project at `project_dir`.
pub fn build_graph(store: &dyn FileStore, project_dir: &Path) -> TetherResult<PackageGraph> {
    let mut graph = PackageGraph::empty();
    let app_name = project_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "app".to_string());
    let app = Package::new(PackageKind::App, app_name, PathBuf::new(), "");
    let app_id = graph.push(app);
    graph.app = app_id;
    resolve(
        store,
        project_dir,
        &mut graph,
        app_id,
        &BTreeSet::new(),
        &BTreeSet::new(),
    )?;
    Ok(graph)
}

fn resolve(
    store: &dyn FileStore,
    project_dir: &Path,
    graph: &mut PackageGraph,
    id: PackageId,
    resolved_at_parent: &BTreeSet<String>,
    resolved_at_grandparent: &BTreeSet<String>,
) -> TetherResult<()> {
    let manifest_path = project_dir.join(&graph.get(id).path).join(MANIFEST_NAME);
    if !store.exists(&manifest_path) {
        graph.get_mut(id).availability = Availability::NotInstalled;
        return Ok(());
    }
    if resolved_at_grandparent.contains(&graph.get(id).name) {
        graph.get_mut(id).availability = Availability::ShadowedByAncestor;
        return Ok(());
    }

    let manifest = Manifest::load(store, &manifest_path)?;
    let version = manifest.version.clone().unwrap_or_default();

    // App projects take their logical name from the framework identifier.
    if graph.get(id).kind == PackageKind::App {
        if let Some(framework_id) = manifest.framework_id() {
            graph.get_mut(id).name = framework_id.to_string();
        }
    }

    let name = graph.get(id).name.clone();
    match graph.dependencies.get(&name).copied() {
        Some(incumbent) if incumbent != id => {
            if compare_versions(&version, &graph.get(incumbent).version) == Ordering::Greater {
                graph.get_mut(incumbent).availability = Availability::ShadowedByDiverged;
                graph.get_mut(id).availability = Availability::Available;
                graph.dependencies.insert(name, id);
            } else {
                // Ties favor the incumbent.
                graph.get_mut(id).availability = Availability::ShadowedByDiverged;
            }
        }
        _ => {
            graph.get_mut(id).availability = Availability::Available;
            graph.dependencies.insert(name, id);
        }
    }

    {
        let package = graph.get_mut(id);
        package.version = version;
        package.manifest = Some(manifest.clone());
    }

    // Names visible to grandchildren: everything visible here plus this
    // node's direct dependencies.
    let mut resolved = resolved_at_parent.clone();
    resolved.extend(manifest.dependencies.keys().cloned());

    for (dep_name, dep_req) in &manifest.dependencies {
        let child_path = graph
            .get(id)
            .path
            .join(NODE_MODULES_DIR_NAME)
            .join(dep_name);
        let child = Package::new(PackageKind::Package, dep_name, child_path, dep_req);
        let child_id = graph.push(child);
        graph.get_mut(id).children.push(child_id);
        resolve(store, project_dir, graph, child_id, &resolved, resolved_at_parent)?;
    }

    Ok(())
}
