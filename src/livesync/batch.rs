//! SyncBatch - time-bounded coalescing of file-change events.
//!
//! The first file of a batch arms a quiet-interval timer; when it
//! expires the whole set flushes as one sync. A `sync_pending` latch
//! keeps a second batch from flushing while the first is still being
//! applied.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Quiet interval before an accumulated batch flushes
pub const BATCH_QUIET_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub struct SyncBatch {
    files: BTreeSet<PathBuf>,
    armed_at: Option<Instant>,
    in_flight: bool,
    quiet: Duration,
}

impl Default for SyncBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncBatch {
    pub fn new() -> SyncBatch {
        SyncBatch::with_quiet_interval(BATCH_QUIET_INTERVAL)
    }

    pub fn with_quiet_interval(quiet: Duration) -> SyncBatch {
        SyncBatch {
            files: BTreeSet::new(),
            armed_at: None,
            in_flight: false,
            quiet,
        }
    }

    /// Enqueue a path. The first file of a batch arms the flush timer;
    /// duplicates within a batch collapse.
    pub fn add_file(&mut self, path: PathBuf) {
        self.files.insert(path);
        if self.armed_at.is_none() {
            self.armed_at = Some(Instant::now());
        }
    }

    /// True from the first `add_file` of a batch until the flush that
    /// took it completes.
    pub fn sync_pending(&self) -> bool {
        self.in_flight || !self.files.is_empty()
    }

    /// True once the quiet interval has elapsed and no earlier flush is
    /// still running.
    pub fn ready(&self) -> bool {
        !self.in_flight
            && !self.files.is_empty()
            && self.armed_at.is_some_and(|t| t.elapsed() >= self.quiet)
    }

    /// Move the accumulated set out for syncing. The batch stays latched
    /// until `complete` is called; files arriving meanwhile open the
    /// next batch.
    pub fn take(&mut self) -> Vec<PathBuf> {
        self.in_flight = true;
        self.armed_at = None;
        std::mem::take(&mut self.files).into_iter().collect()
    }

    /// Mark the in-flight flush finished.
    pub fn complete(&mut self) {
        self.in_flight = false;
    }
}
