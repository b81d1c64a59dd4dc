//! Device-facing traits. The transport itself (discovery, adb/usbmux
//! plumbing) lives outside the engine; these are the seams it plugs
//! into.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::TetherResult;
use crate::platform::{relative_string, strip_platform_suffix, Platform};

/// A file staged for transfer: where it lives locally and where it
/// lands on the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalToDevicePath {
    pub local_path: PathBuf,
    pub device_path: String,
    /// Project-relative path with the platform suffix already rewritten
    pub relative_path: String,
}

/// Map project files to their device locations, rewriting the platform
/// suffix with the device's actual platform.
pub fn map_to_device_paths(
    project_dir: &Path,
    device_root: &str,
    files: &[PathBuf],
    platform: Platform,
) -> Vec<LocalToDevicePath> {
    let root = device_root.trim_end_matches('/');
    files
        .iter()
        .map(|local| {
            let relative = strip_platform_suffix(&relative_string(local, project_dir), platform);
            LocalToDevicePath {
                local_path: local.clone(),
                device_path: format!("{root}/{relative}"),
                relative_path: relative,
            }
        })
        .collect()
}

/// Connection to one attached device. Implemented by the transport
/// layer; mocked in tests.
pub trait DeviceConnection {
    fn identifier(&self) -> &str;
    fn platform(&self) -> Platform;
    fn is_emulator(&self) -> bool;

    fn is_installed(&self, app_id: &str) -> TetherResult<bool>;
    fn install(&self, package: &Path) -> TetherResult<()>;
    fn uninstall(&self, app_id: &str) -> TetherResult<()>;
    fn stop_application(&self, app_id: &str) -> TetherResult<()>;
    fn restart_application(&self, app_id: &str) -> TetherResult<()>;

    fn transfer_files(&self, app_id: &str, files: &[LocalToDevicePath]) -> TetherResult<()>;
    /// Bulk transfer of a whole prepared directory, where the backend
    /// supports it.
    fn transfer_directory(
        &self,
        app_id: &str,
        source: &Path,
        files: &[LocalToDevicePath],
    ) -> TetherResult<()>;
    fn remove_files(&self, app_id: &str, files: &[LocalToDevicePath]) -> TetherResult<()>;

    /// Package-manager-level application reload (the Android live-sync
    /// agent).
    fn reload_application(&self, app_id: &str) -> TetherResult<()>;

    /// Root directory for synced files on the device
    fn sync_root(&self, app_id: &str) -> String;

    /// Open the framed inspector channel. Simulators attach via an
    /// attach-request notification, physical devices via port
    /// forwarding; either way the caller just writes frames.
    fn open_inspector(&self) -> TetherResult<Box<dyn Write + Send>>;
}

/// Per-platform refresh strategy applied after files reach the device
pub trait PlatformLiveSync {
    /// Apply freshly transferred files to the running application.
    fn refresh(
        &self,
        device: &dyn DeviceConnection,
        app_id: &str,
        files: &[LocalToDevicePath],
        live_edit: bool,
    ) -> TetherResult<()>;
}

/// Platform build toolchain, out of scope for the engine
pub trait PlatformBuilder {
    /// Run prepare + build; returns the built package path.
    fn build(&self, platform: Platform, for_device: bool, release: bool) -> TetherResult<PathBuf>;

    /// Path of the newest built package for install.
    fn latest_package(&self, platform: Platform, for_device: bool) -> TetherResult<PathBuf>;

    /// Stamp of the latest build, comparable to `PrepareInfo.time`.
    fn latest_build_time(&self, platform: Platform, for_device: bool) -> Option<String>;

    /// Build output directory for the variant; the live-sync stamp lives
    /// here (the emulator output for simulators).
    fn build_output_dir(&self, platform: Platform, for_device: bool) -> PathBuf;
}
