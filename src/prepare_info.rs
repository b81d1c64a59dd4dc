//! Per-platform prepare stamp and per-device live-sync stamp.
//!
//! `.nsprepareinfo` records the last successful prepare and the build
//! flags in effect; `.nslivesyncinfo` correlates the last prepare whose
//! files a device has actually absorbed.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::TetherResult;
use crate::platform::TargetLayout;
use crate::store::{read_json, write_json, FileStore};

pub const PREPARE_INFO_NAME: &str = ".nsprepareinfo";
pub const LIVESYNC_INFO_NAME: &str = ".nslivesyncinfo";

/// The per-platform record of the last prepare
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepareInfo {
    pub time: String,
    pub bundle: bool,
    pub release: bool,
}

/// The change flags a prepare pass can raise
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectChanges {
    pub app_files_changed: bool,
    pub app_resources_changed: bool,
    pub modules_changed: bool,
    pub config_changed: bool,
    pub package_changed: bool,
    pub native_changed: bool,
}

impl ProjectChanges {
    pub fn all() -> ProjectChanges {
        ProjectChanges {
            app_files_changed: true,
            app_resources_changed: true,
            modules_changed: true,
            config_changed: true,
            package_changed: true,
            native_changed: true,
        }
    }

    pub fn any(&self) -> bool {
        self.app_files_changed
            || self.app_resources_changed
            || self.modules_changed
            || self.config_changed
            || self.package_changed
            || self.native_changed
    }

    /// Changes a hot sync cannot absorb.
    pub fn requires_build(&self) -> bool {
        self.app_resources_changed
            || self.native_changed
            || self.config_changed
            || self.package_changed
    }
}

/// Reads and writes `<platform-root>/.nsprepareinfo`
pub struct PrepareInfoStore<'a> {
    store: &'a dyn FileStore,
    platform_root: PathBuf,
}

impl<'a> PrepareInfoStore<'a> {
    pub fn new(store: &'a dyn FileStore, project_dir: &Path, layout: &TargetLayout) -> Self {
        PrepareInfoStore {
            store,
            platform_root: project_dir.join(&layout.platform_root),
        }
    }

    fn path(&self) -> PathBuf {
        self.platform_root.join(PREPARE_INFO_NAME)
    }

    pub fn read(&self) -> Option<PrepareInfo> {
        if !self.store.exists(&self.path()) {
            return None;
        }
        read_json(self.store, &self.path()).ok()
    }

    /// Reconcile the stored record against the flags in effect. A bundle
    /// or release flip forces every change flag; a missing record means
    /// everything changed.
    pub fn reconcile(&self, changes: &mut ProjectChanges, bundle: bool, release: bool) -> PrepareInfo {
        match self.read() {
            Some(prev) => {
                if prev.bundle != bundle || prev.release != release {
                    *changes = ProjectChanges::all();
                }
                PrepareInfo {
                    time: prev.time,
                    bundle,
                    release,
                }
            }
            None => {
                *changes = ProjectChanges::all();
                PrepareInfo {
                    time: String::new(),
                    bundle,
                    release,
                }
            }
        }
    }

    /// Persist the record iff at least one change flag fired, refreshing
    /// `time` to a stamp strictly greater than the previous one.
    pub fn commit(&self, mut info: PrepareInfo, changes: &ProjectChanges) -> TetherResult<PrepareInfo> {
        if changes.any() {
            let prev = (!info.time.is_empty()).then_some(info.time.as_str());
            info.time = next_stamp(prev);
            write_json(self.store, &self.path(), &info)?;
        }
        Ok(info)
    }
}

/// Wall-clock stamp in epoch milliseconds, guarded to be strictly
/// greater than the previous stamp.
pub fn next_stamp(prev: Option<&str>) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);
    let floor = prev
        .and_then(|p| p.parse::<i64>().ok())
        .map(|p| p + 1)
        .unwrap_or(i64::MIN);
    now.max(floor).to_string()
}

/// Read the per-device stamp from a build output directory.
pub fn read_livesync_stamp(store: &dyn FileStore, build_output: &Path) -> Option<String> {
    let path = build_output.join(LIVESYNC_INFO_NAME);
    if !store.exists(&path) {
        return None;
    }
    store.read_text(&path).ok().map(|s| s.trim().to_string())
}

/// Record that a device has absorbed the prepare stamped `time`.
pub fn write_livesync_stamp(
    store: &dyn FileStore,
    build_output: &Path,
    time: &str,
) -> TetherResult<()> {
    store.write_text(&build_output.join(LIVESYNC_INFO_NAME), time)
}
