//! LiveSyncCoordinator - full and partial syncs against one or more
//! attached devices.
//!
//! Full syncs install the latest platform package and push the whole
//! prepared tree. Partial syncs hash-dedup watcher events, coalesce
//! them per platform, classify the flushed batch, and either deploy or
//! hot-transfer. The live-sync stamp always lands after a successful
//! refresh.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use globset::GlobSet;

use crate::classify::{file_change_requires_build, should_build_when_livesyncing, BuildState};
use crate::config::{LiveSyncOptions, Project};
use crate::error::TetherResult;
use crate::events::LiveSyncEvent;
use crate::platform::{
    relative_string, Platform, TargetLayout, APP_DIR_NAME, APP_RESOURCES_DIR_NAME,
};
use crate::prepare_info::{self, PrepareInfo, PrepareInfoStore};
use crate::store::FileStore;

use super::batch::{SyncBatch, BATCH_QUIET_INTERVAL};
use super::device::{map_to_device_paths, DeviceConnection, PlatformBuilder};
use super::strategy_for;

/// A filesystem event from the external watcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEvent {
    Added,
    Changed,
    Removed,
}

pub struct LiveSyncCoordinator<'a> {
    store: &'a dyn FileStore,
    project: &'a Project,
    options: LiveSyncOptions,
    builder: &'a dyn PlatformBuilder,
    devices: Vec<Box<dyn DeviceConnection + 'a>>,
    excluded: GlobSet,
    batches: HashMap<Platform, SyncBatch>,
    file_hashes: HashMap<PathBuf, String>,
    quiet_interval: Duration,
    on_event: Box<dyn Fn(LiveSyncEvent) + 'a>,
    after_sync: Option<Box<dyn Fn(&[PathBuf]) + 'a>>,
}

impl<'a> LiveSyncCoordinator<'a> {
    pub fn new(
        store: &'a dyn FileStore,
        project: &'a Project,
        options: LiveSyncOptions,
        builder: &'a dyn PlatformBuilder,
        devices: Vec<Box<dyn DeviceConnection + 'a>>,
        on_event: impl Fn(LiveSyncEvent) + 'a,
    ) -> TetherResult<Self> {
        let excluded = project.excluded_matcher()?;
        Ok(LiveSyncCoordinator {
            store,
            project,
            options,
            builder,
            devices,
            excluded,
            batches: HashMap::new(),
            file_hashes: HashMap::new(),
            quiet_interval: BATCH_QUIET_INTERVAL,
            on_event: Box::new(on_event),
            after_sync: None,
        })
    }

    /// Override the batching quiet interval (tests mostly).
    pub fn with_quiet_interval(mut self, quiet: Duration) -> Self {
        self.quiet_interval = quiet;
        self
    }

    /// Hook invoked after every successful hot batch, with the synced
    /// local paths.
    pub fn with_after_sync(mut self, hook: impl Fn(&[PathBuf]) + 'a) -> Self {
        self.after_sync = Some(Box::new(hook));
        self
    }

    pub fn sync_all_files(&self) -> bool {
        self.options.sync_all_files
    }

    fn emit(&self, event: LiveSyncEvent) {
        (self.on_event)(event);
    }

    /// Surface a non-fatal problem through the event stream.
    pub fn report_error(&self, message: String) {
        self.emit(LiveSyncEvent::SyncFailed { message });
    }

    /// Run `action` for every attached device on `platform`, honoring
    /// the `--device` filter. Each device's action completes before the
    /// next starts.
    fn for_each_device(
        &self,
        platform: Platform,
        action: &mut dyn FnMut(&dyn DeviceConnection) -> TetherResult<()>,
    ) -> TetherResult<()> {
        for device in &self.devices {
            if device.platform() != platform {
                continue;
            }
            if let Some(wanted) = &self.options.device {
                if device.identifier() != wanted {
                    continue;
                }
            }
            action(device.as_ref())?;
        }
        Ok(())
    }

    // ---- full sync -------------------------------------------------

    /// Full sync against every matching device: build if the device has
    /// not absorbed the last prepare, clean-install, transfer the whole
    /// prepared tree, then refresh and stamp (or run `post_action` and
    /// stop).
    pub fn full_sync(
        &self,
        platform: Platform,
        post_action: Option<&dyn Fn(&dyn DeviceConnection) -> TetherResult<()>>,
    ) -> TetherResult<()> {
        let layout = TargetLayout::for_platform(platform, &self.project.dir);
        self.for_each_device(platform, &mut |device| {
            self.full_sync_device(device, platform, &layout, post_action)
        })
    }

    fn full_sync_device(
        &self,
        device: &dyn DeviceConnection,
        platform: Platform,
        layout: &TargetLayout,
        post_action: Option<&dyn Fn(&dyn DeviceConnection) -> TetherResult<()>>,
    ) -> TetherResult<()> {
        let for_device = !device.is_emulator();
        let info_store = PrepareInfoStore::new(self.store, &self.project.dir, layout);

        if self.device_needs_build(device, platform, info_store.read().as_ref()) {
            self.emit(LiveSyncEvent::Building {
                platform: platform.name().to_string(),
            });
            self.builder.build(platform, for_device, self.options.release)?;
        }

        self.emit(LiveSyncEvent::Installing {
            device: device.identifier().to_string(),
        });
        if device.is_installed(&self.project.app_id)? {
            device.stop_application(&self.project.app_id)?;
            device.uninstall(&self.project.app_id)?;
        }
        let package = self.builder.latest_package(platform, for_device)?;
        device.install(&package)?;

        let files = self.project_sync_files(layout)?;
        let sync_root = device.sync_root(&self.project.app_id);
        let paths = map_to_device_paths(&self.project.dir, &sync_root, &files, device.platform());

        self.emit(LiveSyncEvent::TransferringFiles {
            device: device.identifier().to_string(),
            count: paths.len(),
        });
        if supports_directory_transfer(device) {
            let source = self.project.dir.join(&layout.app);
            device.transfer_directory(&self.project.app_id, &source, &paths)?;
        } else {
            device.transfer_files(&self.project.app_id, &paths)?;
        }

        if let Some(action) = post_action {
            return action(device);
        }

        self.emit(LiveSyncEvent::Refreshing {
            device: device.identifier().to_string(),
        });
        strategy_for(device.platform()).refresh(
            device,
            &self.project.app_id,
            &paths,
            self.options.live_edit,
        )?;
        self.stamp_device(device, platform, info_store.read().as_ref())?;
        self.emit(LiveSyncEvent::Synced {
            app: self.project.app_id.clone(),
            device: device.identifier().to_string(),
        });
        Ok(())
    }

    fn device_needs_build(
        &self,
        device: &dyn DeviceConnection,
        platform: Platform,
        info: Option<&PrepareInfo>,
    ) -> bool {
        let Some(info) = info else {
            return true;
        };
        let for_device = !device.is_emulator();
        let build_time = self.builder.latest_build_time(platform, for_device);
        let stamp_dir = self.builder.build_output_dir(platform, for_device);
        let stamp = prepare_info::read_livesync_stamp(self.store, &stamp_dir);
        let state = BuildState {
            prepare_time: &info.time,
            latest_build_time: build_time.as_deref(),
            livesync_stamp: stamp.as_deref(),
            // No changes summary at this point: assume a build matters.
            changes_require_build: true,
        };
        should_build_when_livesyncing(&state)
    }

    /// The prepared per-target app tree, minus excluded paths.
    fn project_sync_files(&self, layout: &TargetLayout) -> TetherResult<Vec<PathBuf>> {
        let root = self.project.dir.join(&layout.app);
        let mut files = Vec::new();
        for entry in self.store.walk(&root)? {
            if entry.is_dir {
                continue;
            }
            let rel = relative_string(&entry.path, &self.project.dir);
            if self.excluded.is_match(&rel) {
                continue;
            }
            files.push(entry.path);
        }
        Ok(files)
    }

    fn stamp_device(
        &self,
        device: &dyn DeviceConnection,
        platform: Platform,
        info: Option<&PrepareInfo>,
    ) -> TetherResult<()> {
        if let Some(info) = info {
            let out = self
                .builder
                .build_output_dir(platform, !device.is_emulator());
            prepare_info::write_livesync_stamp(self.store, &out, &info.time)?;
        }
        Ok(())
    }

    // ---- partial sync ----------------------------------------------

    /// Feed one watcher event into the coordinator.
    pub fn on_file_event(
        &mut self,
        platform: Platform,
        event: FileEvent,
        path: &Path,
    ) -> TetherResult<()> {
        let relative = relative_string(path, &self.project.dir);

        // Resource edits cannot be hot-synced.
        if relative.starts_with(&format!("{APP_DIR_NAME}/{APP_RESOURCES_DIR_NAME}/")) {
            self.emit(LiveSyncEvent::ResourceChangeNeedsFullBuild { path: relative });
            return Ok(());
        }

        match event {
            FileEvent::Added | FileEvent::Changed => {
                let hash = match self.store.hash_file(path) {
                    Ok(hash) => hash,
                    // Vanished between the event and the read.
                    Err(_) => return Ok(()),
                };
                if self.file_hashes.get(path) == Some(&hash) {
                    return Ok(());
                }
                if self.excluded.is_match(&relative) {
                    return Ok(());
                }
                self.file_hashes.insert(path.to_path_buf(), hash);
                let quiet = self.quiet_interval;
                self.batches
                    .entry(platform)
                    .or_insert_with(|| SyncBatch::with_quiet_interval(quiet))
                    .add_file(path.to_path_buf());
            }
            FileEvent::Removed => {
                self.file_hashes.remove(path);
                if self.excluded.is_match(&relative) {
                    return Ok(());
                }
                self.remove_from_devices(platform, path)?;
            }
        }
        Ok(())
    }

    fn remove_from_devices(&self, platform: Platform, path: &Path) -> TetherResult<()> {
        self.for_each_device(platform, &mut |device| {
            let paths = map_to_device_paths(
                &self.project.dir,
                &device.sync_root(&self.project.app_id),
                std::slice::from_ref(&path.to_path_buf()),
                device.platform(),
            );
            device.remove_files(&self.project.app_id, &paths)
        })
    }

    /// Flush every batch whose quiet interval has elapsed. Batched sync
    /// errors are reported and swallowed; the next event opens a fresh
    /// batch.
    pub fn poll(&mut self) {
        let ready: Vec<Platform> = self
            .batches
            .iter()
            .filter(|(_, batch)| batch.ready())
            .map(|(platform, _)| *platform)
            .collect();
        for platform in ready {
            let Some(batch) = self.batches.get_mut(&platform) else {
                continue;
            };
            let files = batch.take();
            let outcome = self.sync_batch(platform, &files);
            if let Some(batch) = self.batches.get_mut(&platform) {
                batch.complete();
            }
            if let Err(err) = outcome {
                self.emit(LiveSyncEvent::SyncFailed {
                    message: err.to_string(),
                });
            }
        }
    }

    /// Partition the flushed batch: one build-requiring file reroutes
    /// the whole batch into a deploy cycle.
    fn sync_batch(&self, platform: Platform, files: &[PathBuf]) -> TetherResult<()> {
        let mut requires_build = false;
        for file in files {
            if file_change_requires_build(self.store, &self.project.dir, file)? {
                requires_build = true;
                break;
            }
        }
        if requires_build {
            return self.deploy(platform);
        }
        self.transfer_and_refresh(platform, files)
    }

    /// Build, reinstall, and blind-restart every matching device.
    fn deploy(&self, platform: Platform) -> TetherResult<()> {
        self.for_each_device(platform, &mut |device| {
            let for_device = !device.is_emulator();
            self.emit(LiveSyncEvent::Building {
                platform: platform.name().to_string(),
            });
            self.builder.build(platform, for_device, self.options.release)?;
            self.emit(LiveSyncEvent::Installing {
                device: device.identifier().to_string(),
            });
            if device.is_installed(&self.project.app_id)? {
                device.stop_application(&self.project.app_id)?;
                device.uninstall(&self.project.app_id)?;
            }
            device.install(&self.builder.latest_package(platform, for_device)?)?;
            device.restart_application(&self.project.app_id)
        })
    }

    fn transfer_and_refresh(&self, platform: Platform, files: &[PathBuf]) -> TetherResult<()> {
        let layout = TargetLayout::for_platform(platform, &self.project.dir);
        let info = PrepareInfoStore::new(self.store, &self.project.dir, &layout).read();
        self.for_each_device(platform, &mut |device| {
            let paths = map_to_device_paths(
                &self.project.dir,
                &device.sync_root(&self.project.app_id),
                files,
                device.platform(),
            );
            self.emit(LiveSyncEvent::TransferringFiles {
                device: device.identifier().to_string(),
                count: paths.len(),
            });
            device.transfer_files(&self.project.app_id, &paths)?;
            self.emit(LiveSyncEvent::Refreshing {
                device: device.identifier().to_string(),
            });
            strategy_for(device.platform()).refresh(
                device,
                &self.project.app_id,
                &paths,
                self.options.live_edit,
            )?;
            self.stamp_device(device, platform, info.as_ref())?;
            self.emit(LiveSyncEvent::Synced {
                app: self.project.app_id.clone(),
                device: device.identifier().to_string(),
            });
            Ok(())
        })?;
        if let Some(hook) = &self.after_sync {
            hook(files);
        }
        Ok(())
    }
}

/// Android devices and iOS simulators accept a whole-directory push on
/// full sync.
fn supports_directory_transfer(device: &dyn DeviceConnection) -> bool {
    match device.platform() {
        Platform::Android => !device.is_emulator(),
        Platform::Ios => device.is_emulator(),
    }
}
