//! Tether - incremental prepare and live-sync engine for mobile
//! cross-platform app projects
//!
//! Tether flattens a project's installed package tree into a per-target
//! output directory, re-materializes it incrementally, and pushes only
//! the files that changed to one or more attached devices.

pub mod classify;
pub mod config;
pub mod delta;
pub mod error;
pub mod events;
pub mod graph;
pub mod inventory;
pub mod livesync;
pub mod manifest;
pub mod platform;
pub mod prepare;
pub mod prepare_info;
pub mod store;
pub mod watcher;

// Re-exports for convenience
pub use config::{LiveSyncOptions, PrepareOptions, Project};
pub use error::{TetherError, TetherResult};
pub use events::{LiveSyncEvent, PrepareEvent};
pub use platform::{Platform, TargetLayout};
pub use prepare::{prepare_platform, PrepareResult};
pub use store::{FileStore, LocalStore};
