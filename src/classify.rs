//! ChangeClassifier - decides whether an edit can be hot-synced and
//! whether a live-sync pass needs a fresh platform build.

use std::ffi::OsStr;
use std::path::Path;

use crate::error::TetherResult;
use crate::manifest::{Manifest, MANIFEST_NAME};
use crate::platform::{relative_string, NODE_MODULES_DIR_NAME, PLATFORMS_DIR_NAME};
use crate::store::FileStore;

/// Edits inside the core modules package never force a native rebuild.
pub const CORE_MODULES_PACKAGE: &str = "tns-core-modules";

/// Conservative per-file predicate: does this edit require a full
/// platform build?
///
/// Manifest edits always do. An edit inside an installed package does
/// when some enclosing package is framework-aware and the file sits in
/// its `platforms/` subtree.
pub fn file_change_requires_build(
    store: &dyn FileStore,
    project_dir: &Path,
    file: &Path,
) -> TetherResult<bool> {
    if file.file_name() == Some(OsStr::new(MANIFEST_NAME)) {
        return Ok(true);
    }

    let rel = relative_string(file, project_dir);
    if !rel
        .split('/')
        .any(|segment| segment == NODE_MODULES_DIR_NAME)
    {
        return Ok(false);
    }
    if rel.starts_with(&format!("{NODE_MODULES_DIR_NAME}/{CORE_MODULES_PACKAGE}/")) {
        return Ok(false);
    }

    let mut current = file.parent();
    while let Some(dir) = current {
        if !dir.starts_with(project_dir) || dir == project_dir {
            break;
        }
        let manifest_path = dir.join(MANIFEST_NAME);
        if store.exists(&manifest_path) {
            let manifest = Manifest::load(store, &manifest_path)?;
            if manifest.is_framework_package() && file.starts_with(dir.join(PLATFORMS_DIR_NAME)) {
                return Ok(true);
            }
        }
        current = dir.parent();
    }
    Ok(false)
}

/// Inputs consulted when deciding whether a live-sync pass must build
/// first.
#[derive(Debug, Clone, Copy)]
pub struct BuildState<'a> {
    /// `PrepareInfo.time` of the last prepare
    pub prepare_time: &'a str,
    /// Stamp of the latest build for this platform and device variant
    pub latest_build_time: Option<&'a str>,
    /// The device's `.nslivesyncinfo` stamp, if any
    pub livesync_stamp: Option<&'a str>,
    /// Whether the latest changes summary reports a build is required
    pub changes_require_build: bool,
}

/// A device whose build already matches the last prepare needs nothing;
/// a device with a live-sync stamp rebuilds only when the stamp is stale
/// *and* the changes demand it.
pub fn should_build_when_livesyncing(state: &BuildState<'_>) -> bool {
    if state.latest_build_time == Some(state.prepare_time) {
        return false;
    }
    match state.livesync_stamp {
        Some(stamp) => state.prepare_time != stamp && state.changes_require_build,
        None => state.changes_require_build,
    }
}
