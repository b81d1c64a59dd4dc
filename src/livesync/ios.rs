//! iOS refresh strategy: fast-sync partition, live-edit script patching
//! over the inspector channel, restart fallback.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::TetherResult;

use super::device::{DeviceConnection, LocalToDevicePath, PlatformLiveSync};
use super::inspector;

/// Extensions a hot refresh can absorb; any other extension restarts
/// the application.
pub const FAST_SYNC_EXTENSIONS: [&str; 3] = ["js", "css", "xml"];

pub struct IosLiveSync;

impl IosLiveSync {
    /// Push each changed script into the running app, then reload the
    /// page once.
    fn live_edit_scripts(
        &self,
        device: &dyn DeviceConnection,
        scripts: &[&LocalToDevicePath],
    ) -> TetherResult<()> {
        let mut socket = device.open_inspector()?;
        let mut id = 0u64;
        for file in scripts {
            let source = fs::read_to_string(&file.local_path)?;
            id += 1;
            let message = inspector::set_script_source(id, &file.relative_path, &source);
            socket.write_all(&inspector::encode_frame(&message))?;
        }
        id += 1;
        socket.write_all(&inspector::encode_frame(&inspector::page_reload(id)))?;
        socket.flush()?;
        Ok(())
    }

    fn reload_page(&self, device: &dyn DeviceConnection) -> TetherResult<()> {
        let mut socket = device.open_inspector()?;
        socket.write_all(&inspector::encode_frame(&inspector::page_reload(1)))?;
        socket.flush()?;
        Ok(())
    }
}

fn extension(file: &LocalToDevicePath) -> String {
    Path::new(&file.relative_path)
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl PlatformLiveSync for IosLiveSync {
    fn refresh(
        &self,
        device: &dyn DeviceConnection,
        app_id: &str,
        files: &[LocalToDevicePath],
        live_edit: bool,
    ) -> TetherResult<()> {
        let (scripts, others): (Vec<&LocalToDevicePath>, Vec<&LocalToDevicePath>) =
            files.iter().partition(|f| extension(f) == "js");

        if others
            .iter()
            .any(|f| !FAST_SYNC_EXTENSIONS.contains(&extension(f).as_str()))
        {
            return device.restart_application(app_id);
        }

        if live_edit && others.is_empty() {
            // Socket trouble downgrades to a restart, and the next
            // refresh re-establishes the channel.
            match self.live_edit_scripts(device, &scripts) {
                Ok(()) => Ok(()),
                Err(_) => device.restart_application(app_id),
            }
        } else {
            match self.reload_page(device) {
                Ok(()) => Ok(()),
                Err(_) => device.restart_application(app_id),
            }
        }
    }
}
