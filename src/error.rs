//! Error types for Tether.
//!
//! Library errors use `thiserror`; the binary boundary wraps them in
//! `anyhow` for display. Messages carry a fix suggestion where one
//! exists.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Tether operations
pub type TetherResult<T> = Result<T, TetherError>;

/// Main error type for Tether operations
#[derive(Error, Debug)]
pub enum TetherError {
    /// A package manifest could not be parsed. Fatal to the current
    /// rebuild; an absent manifest is a package state, not an error.
    #[error("malformed package manifest {file}: {message}\n  → Fix: validate the JSON (a UTF-8 BOM is tolerated, anything else is not)")]
    ManifestParse { file: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error for a persisted state file
    #[error("invalid JSON in {file}: {source}")]
    Json {
        file: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Project root has no package manifest
    #[error("project not found at {path}\n  → Fix: run from a project root containing package.json")]
    ProjectNotFound { path: PathBuf },

    /// An exclusion glob failed to compile
    #[error("invalid exclude pattern '{pattern}': {message}")]
    BadExcludePattern { pattern: String, message: String },

    /// File transfer to a device failed
    #[error("device transfer failed on {device}: {message}")]
    DeviceTransfer { device: String, message: String },

    /// The inspector channel could not be established or written
    #[error("inspector socket: {0}")]
    InspectorSocket(String),

    /// No built application package exists for the target
    #[error("no application package has been built for {platform}\n  → Fix: run a build for the target platform first")]
    NoBuildOutput { platform: String },
}
