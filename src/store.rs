//! FileStore - the blocking filesystem surface the engine needs.
//!
//! All calls are synchronous. Writes go through a tempfile + rename so a
//! crash never leaves a half-written state file behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::error::{TetherError, TetherResult};

/// Maximum retries for atomic rename (Windows file locking)
const MAX_RETRIES: u32 = 3;

/// Retry delays in milliseconds
const RETRY_DELAYS_MS: [u64; 3] = [100, 500, 1000];

/// One entry from a recursive walk.
#[derive(Debug, Clone)]
pub struct WalkedEntry {
    pub path: PathBuf,
    pub is_dir: bool,
    /// Modification time, integer milliseconds since the epoch.
    pub mtime_ms: i64,
}

/// Abstract file store interface
pub trait FileStore {
    /// Read file content as string
    fn read_text(&self, path: &Path) -> TetherResult<String>;

    /// Write content to file atomically
    fn write_text(&self, path: &Path, content: &str) -> TetherResult<()>;

    /// Check if the path exists
    fn exists(&self, path: &Path) -> bool;

    /// Modification time in milliseconds since the epoch
    fn mtime_ms(&self, path: &Path) -> TetherResult<i64>;

    /// Copy a file; the target's parent must already exist
    fn copy_file(&self, from: &Path, to: &Path) -> TetherResult<()>;

    /// Create directory and parents
    fn create_dir_all(&self, path: &Path) -> TetherResult<()>;

    /// Remove a single file
    fn remove_file(&self, path: &Path) -> TetherResult<()>;

    /// Remove a single (empty) directory
    fn remove_dir(&self, path: &Path) -> TetherResult<()>;

    /// Recursive listing, directories before their contents, symlinks not
    /// followed. A missing root yields an empty list.
    fn walk(&self, root: &Path) -> TetherResult<Vec<WalkedEntry>>;

    /// Content hash of a file (SHA-256, `sha256:`-prefixed hex)
    fn hash_file(&self, path: &Path) -> TetherResult<String>;
}

/// Local filesystem implementation
pub struct LocalStore;

impl FileStore for LocalStore {
    fn read_text(&self, path: &Path) -> TetherResult<String> {
        Ok(fs::read_to_string(path)?)
    }

    fn write_text(&self, path: &Path, content: &str) -> TetherResult<()> {
        atomic_write(path, content.as_bytes())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn mtime_ms(&self, path: &Path) -> TetherResult<i64> {
        let modified = fs::metadata(path)?.modified()?;
        Ok(modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0))
    }

    fn copy_file(&self, from: &Path, to: &Path) -> TetherResult<()> {
        fs::copy(from, to)?;
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> TetherResult<()> {
        Ok(fs::create_dir_all(path)?)
    }

    fn remove_file(&self, path: &Path) -> TetherResult<()> {
        Ok(fs::remove_file(path)?)
    }

    fn remove_dir(&self, path: &Path) -> TetherResult<()> {
        Ok(fs::remove_dir(path)?)
    }

    fn walk(&self, root: &Path) -> TetherResult<Vec<WalkedEntry>> {
        if !root.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
            let entry = entry.map_err(|e| TetherError::Io(std::io::Error::other(e.to_string())))?;
            let meta = entry.metadata().map_err(|e| TetherError::Io(std::io::Error::other(e.to_string())))?;
            let mtime_ms = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as i64)
                .unwrap_or(0);
            entries.push(WalkedEntry {
                path: entry.path().to_path_buf(),
                is_dir: meta.is_dir(),
                mtime_ms,
            });
        }
        Ok(entries)
    }

    fn hash_file(&self, path: &Path) -> TetherResult<String> {
        let content = fs::read(path)?;
        Ok(hash_content(&content))
    }
}

/// Read a JSON state file, tolerating a UTF-8 BOM.
pub fn read_json<T: DeserializeOwned>(store: &dyn FileStore, path: &Path) -> TetherResult<T> {
    let text = store.read_text(path)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    serde_json::from_str(text).map_err(|source| TetherError::Json {
        file: path.to_path_buf(),
        source,
    })
}

/// Write a JSON state file atomically.
pub fn write_json<T: Serialize>(store: &dyn FileStore, path: &Path, value: &T) -> TetherResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(|source| TetherError::Json {
        file: path.to_path_buf(),
        source,
    })?;
    store.write_text(path, &text)
}

/// Write content to a file atomically.
///
/// Uses tempfile + rename. On Windows, retries with backoff if the file
/// is locked.
pub fn atomic_write(path: &Path, content: &[u8]) -> TetherResult<()> {
    let dir = path.parent().unwrap_or(Path::new("."));

    fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(content)?;
    temp.flush()?;

    for attempt in 0..=MAX_RETRIES {
        match temp.persist(path) {
            Ok(_) => return Ok(()),
            Err(e) => {
                if attempt < MAX_RETRIES {
                    let delay = Duration::from_millis(RETRY_DELAYS_MS[attempt as usize]);
                    thread::sleep(delay);
                    temp = e.file;
                } else {
                    return Err(e.error.into());
                }
            }
        }
    }

    Ok(())
}

/// SHA-256 content hash, `sha256:`-prefixed hex
pub fn hash_content(content: &[u8]) -> String {
    let hash = Sha256::digest(content);
    format!("sha256:{hash:x}")
}
