//! Progress events in NDJSON-friendly form.
//!
//! The engine never prints; callers receive these through callbacks and
//! decide between human lines (`message()`) and NDJSON (`to_json()`).

use serde::Serialize;

/// Events emitted by the rebuild pipeline
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PrepareEvent {
    PrepareStarted {
        platform: String,
    },
    /// Two packages mapped a file onto the same target; the later writer
    /// wins.
    CopyCollision {
        target: String,
        winner: String,
    },
    PrepareFinished {
        platform: String,
        copied: usize,
        removed: usize,
    },
}

impl PrepareEvent {
    pub fn message(&self) -> String {
        match self {
            PrepareEvent::PrepareStarted { platform } => {
                format!("Preparing {platform} project...")
            }
            PrepareEvent::CopyCollision { target, winner } => {
                format!("Multiple sources for {target}; using {winner}")
            }
            PrepareEvent::PrepareFinished { platform, copied, removed } => {
                format!("Project successfully prepared ({platform}): {copied} copied, {removed} removed")
            }
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Events emitted by the live-sync coordinator
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LiveSyncEvent {
    Building {
        platform: String,
    },
    Installing {
        device: String,
    },
    TransferringFiles {
        device: String,
        count: usize,
    },
    Refreshing {
        device: String,
    },
    /// An edit under App_Resources cannot be hot-synced.
    ResourceChangeNeedsFullBuild {
        path: String,
    },
    Synced {
        app: String,
        device: String,
    },
    SyncFailed {
        message: String,
    },
}

impl LiveSyncEvent {
    pub fn message(&self) -> String {
        match self {
            LiveSyncEvent::Building { platform } => format!("Building {platform}..."),
            LiveSyncEvent::Installing { device } => format!("Installing on device {device}..."),
            LiveSyncEvent::TransferringFiles { .. } => "Transferring project files...".to_string(),
            LiveSyncEvent::Refreshing { device } => format!("Applying changes on device {device}..."),
            LiveSyncEvent::ResourceChangeNeedsFullBuild { path } => {
                format!("Skipping {path}: resource changes require a full build")
            }
            // A debugger client keys off this exact line; keep it stable.
            LiveSyncEvent::Synced { app, device } => {
                format!("Successfully synced application {app} on device {device}")
            }
            LiveSyncEvent::SyncFailed { message } => format!("Unable to sync files: {message}"),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
