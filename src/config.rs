//! Project description and the invocation options the engine consumes.

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::{TetherError, TetherResult};
use crate::manifest::{Manifest, MANIFEST_NAME};
use crate::store::FileStore;

/// Flags in effect for a prepare pass. A flip of either flag invalidates
/// the previous prepare entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrepareOptions {
    pub bundle: bool,
    pub release: bool,
}

/// Options for a live-sync session
#[derive(Debug, Clone, Default)]
pub struct LiveSyncOptions {
    /// Restrict syncing to one device identifier
    pub device: Option<String>,
    /// Patch scripts in the running app instead of reloading
    pub live_edit: bool,
    /// Watch installed packages too, not just the app tree
    pub sync_all_files: bool,
    pub release: bool,
}

/// A loaded project: root directory, application identifier, exclusion
/// patterns.
#[derive(Debug, Clone)]
pub struct Project {
    pub dir: PathBuf,
    pub app_id: String,
    /// Globs matched case-insensitively against project-relative paths;
    /// matching files never live-sync.
    pub excluded_project_dirs_and_files: Vec<String>,
}

impl Project {
    /// Load from `<dir>/package.json`. The framework block supplies the
    /// application identifier; without one the directory name stands in.
    pub fn load(store: &dyn FileStore, dir: &Path) -> TetherResult<Project> {
        let manifest_path = dir.join(MANIFEST_NAME);
        if !store.exists(&manifest_path) {
            return Err(TetherError::ProjectNotFound { path: dir.to_path_buf() });
        }
        let manifest = Manifest::load(store, &manifest_path)?;
        let app_id = manifest
            .framework_id()
            .map(str::to_string)
            .unwrap_or_else(|| {
                dir.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "app".to_string())
            });
        Ok(Project {
            dir: dir.to_path_buf(),
            app_id,
            excluded_project_dirs_and_files: Vec::new(),
        })
    }

    pub fn with_excludes(mut self, patterns: Vec<String>) -> Project {
        self.excluded_project_dirs_and_files = patterns;
        self
    }

    /// Compiled matcher over the exclusion patterns, case-insensitive.
    pub fn excluded_matcher(&self) -> TetherResult<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_project_dirs_and_files {
            let glob = GlobBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| TetherError::BadExcludePattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
            builder.add(glob);
        }
        builder.build().map_err(|e| TetherError::BadExcludePattern {
            pattern: String::new(),
            message: e.to_string(),
        })
    }
}
