//! File watcher adapter for continuous live sync.
//!
//! Bridges `notify` events into the coordinator's partial-sync entry
//! point and polls batch flushes, in a blocking loop with graceful
//! shutdown via an atomic flag.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::{TetherError, TetherResult};
use crate::livesync::{FileEvent, LiveSyncCoordinator};
use crate::platform::{Platform, APP_DIR_NAME, NODE_MODULES_DIR_NAME};

fn notify_error(e: notify::Error) -> TetherError {
    TetherError::Io(std::io::Error::other(e.to_string()))
}

/// Watch the project and live-sync every change until `running` drops.
pub fn watch(
    coordinator: &mut LiveSyncCoordinator<'_>,
    platform: Platform,
    project_dir: &Path,
    running: Arc<AtomicBool>,
) -> TetherResult<()> {
    let (tx, rx) = channel();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                let kind = match event.kind {
                    EventKind::Create(_) => Some(FileEvent::Added),
                    EventKind::Modify(_) => Some(FileEvent::Changed),
                    EventKind::Remove(_) => Some(FileEvent::Removed),
                    _ => None,
                };
                if let Some(kind) = kind {
                    for path in event.paths {
                        let _ = tx.send((kind, path));
                    }
                }
            }
        },
        Config::default(),
    )
    .map_err(notify_error)?;

    watcher
        .watch(&project_dir.join(APP_DIR_NAME), RecursiveMode::Recursive)
        .map_err(notify_error)?;
    if coordinator.sync_all_files() {
        let node_modules = project_dir.join(NODE_MODULES_DIR_NAME);
        if node_modules.exists() {
            watcher
                .watch(&node_modules, RecursiveMode::Recursive)
                .map_err(notify_error)?;
        }
    }

    while running.load(Ordering::SeqCst) {
        if let Ok((kind, path)) = rx.recv_timeout(Duration::from_millis(50)) {
            if kind != FileEvent::Removed && path.is_dir() {
                continue;
            }
            if let Err(err) = coordinator.on_file_event(platform, kind, &path) {
                coordinator.report_error(err.to_string());
            }
        }
        coordinator.poll();
    }

    Ok(())
}
