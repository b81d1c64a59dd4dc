//! Live sync: event batching, device strategies, and the coordinator
//! that drives them.

pub mod batch;
pub mod coordinator;
pub mod device;
pub mod inspector;

mod android;
mod ios;

pub use android::AndroidLiveSync;
pub use batch::{SyncBatch, BATCH_QUIET_INTERVAL};
pub use coordinator::{FileEvent, LiveSyncCoordinator};
pub use device::{
    map_to_device_paths, DeviceConnection, LocalToDevicePath, PlatformBuilder, PlatformLiveSync,
};
pub use ios::{IosLiveSync, FAST_SYNC_EXTENSIONS};

use crate::platform::Platform;

/// The refresh strategy for a device's platform.
pub fn strategy_for(platform: Platform) -> Box<dyn PlatformLiveSync> {
    match platform {
        Platform::Android => Box::new(AndroidLiveSync),
        Platform::Ios => Box::new(IosLiveSync),
    }
}
