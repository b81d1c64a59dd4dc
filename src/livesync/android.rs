//! Android refresh strategy: the device's own live-sync agent performs
//! a package-manager-level reload.

use crate::error::TetherResult;

use super::device::{DeviceConnection, LocalToDevicePath, PlatformLiveSync};

pub struct AndroidLiveSync;

impl PlatformLiveSync for AndroidLiveSync {
    fn refresh(
        &self,
        device: &dyn DeviceConnection,
        app_id: &str,
        _files: &[LocalToDevicePath],
        _live_edit: bool,
    ) -> TetherResult<()> {
        device.reload_application(app_id)
    }
}
