//! Delta - the four-set description of the work that brings a target
//! output directory into the desired state.

mod planner;

pub use planner::{build_delta, rebuild_delta};

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::error::TetherResult;
use crate::store::FileStore;

/// Source side of a planned copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopySource {
    pub absolute_path: PathBuf,
    pub mtime_ms: i64,
}

/// Keys are paths relative to the project root, '/'-separated; `mkdir`
/// and `rmdir` entries always end in '/'.
#[derive(Debug, Clone, Default)]
pub struct Delta {
    pub mkdir: BTreeSet<String>,
    pub copy: BTreeMap<String, CopySource>,
    pub rmfile: BTreeSet<String>,
    pub rmdir: BTreeSet<String>,
}

impl Delta {
    /// Whether the script surface changed at all.
    pub fn changed_scripts(&self) -> bool {
        !self.copy.is_empty() || !self.rmfile.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.mkdir.is_empty()
            && self.copy.is_empty()
            && self.rmfile.is_empty()
            && self.rmdir.is_empty()
    }

    /// Apply order is the correctness-critical step: mkdir ascending so
    /// parents exist before children, then copies, then file removals,
    /// then rmdir descending so directories empty out bottom-up.
    pub fn apply(&self, store: &dyn FileStore, project_dir: &Path) -> TetherResult<()> {
        for dir in &self.mkdir {
            store.create_dir_all(&project_dir.join(dir.trim_end_matches('/')))?;
        }
        for (target, source) in &self.copy {
            store.copy_file(&source.absolute_path, &project_dir.join(target))?;
        }
        for file in &self.rmfile {
            store.remove_file(&project_dir.join(file))?;
        }
        for dir in self.rmdir.iter().rev() {
            store.remove_dir(&project_dir.join(dir.trim_end_matches('/')))?;
        }
        Ok(())
    }
}
