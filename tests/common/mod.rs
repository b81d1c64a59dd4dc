//! Shared fixtures: on-disk project builder, mock device transport,
//! mock platform builder.

#![allow(dead_code)]

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use tether::error::{TetherError, TetherResult};
use tether::livesync::{DeviceConnection, LocalToDevicePath, PlatformBuilder};
use tether::Platform;

/// Write a file under `root`, creating parents.
pub fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// A throwaway project with an app identifier and one dependency `foo`.
pub fn basic_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "package.json",
        r#"{"version": "1.0.0", "nativescript": {"id": "org.example.app"}, "dependencies": {"foo": "1.0.0"}}"#,
    );
    write(dir.path(), "app/main.js", "main");
    write(
        dir.path(),
        "node_modules/foo/package.json",
        r#"{"name": "foo", "version": "1.0.0"}"#,
    );
    write(dir.path(), "node_modules/foo/index.js", "index");
    dir
}

/// Sink that appends into a shared buffer, standing in for the
/// inspector socket.
struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// In-memory device recording every call.
#[derive(Clone)]
pub struct MockDevice {
    pub id: String,
    pub platform: Platform,
    pub emulator: bool,
    pub installed: Arc<Mutex<bool>>,
    pub log: Arc<Mutex<Vec<String>>>,
    pub transfers: Arc<Mutex<Vec<Vec<LocalToDevicePath>>>>,
    pub inspector: Arc<Mutex<Vec<u8>>>,
    pub fail_transfer: bool,
    pub fail_inspector: bool,
}

impl MockDevice {
    pub fn new(id: &str, platform: Platform, emulator: bool) -> MockDevice {
        MockDevice {
            id: id.to_string(),
            platform,
            emulator,
            installed: Arc::new(Mutex::new(false)),
            log: Arc::new(Mutex::new(Vec::new())),
            transfers: Arc::new(Mutex::new(Vec::new())),
            inspector: Arc::new(Mutex::new(Vec::new())),
            fail_transfer: false,
            fail_inspector: false,
        }
    }

    pub fn log_contains(&self, needle: &str) -> bool {
        self.log.lock().unwrap().iter().any(|l| l.contains(needle))
    }

    fn record(&self, entry: impl Into<String>) {
        self.log.lock().unwrap().push(entry.into());
    }
}

impl DeviceConnection for MockDevice {
    fn identifier(&self) -> &str {
        &self.id
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    fn is_emulator(&self) -> bool {
        self.emulator
    }

    fn is_installed(&self, _app_id: &str) -> TetherResult<bool> {
        Ok(*self.installed.lock().unwrap())
    }

    fn install(&self, package: &Path) -> TetherResult<()> {
        *self.installed.lock().unwrap() = true;
        self.record(format!("install:{}", package.display()));
        Ok(())
    }

    fn uninstall(&self, _app_id: &str) -> TetherResult<()> {
        *self.installed.lock().unwrap() = false;
        self.record("uninstall");
        Ok(())
    }

    fn stop_application(&self, _app_id: &str) -> TetherResult<()> {
        self.record("stop");
        Ok(())
    }

    fn restart_application(&self, _app_id: &str) -> TetherResult<()> {
        self.record("restart");
        Ok(())
    }

    fn transfer_files(&self, _app_id: &str, files: &[LocalToDevicePath]) -> TetherResult<()> {
        if self.fail_transfer {
            return Err(TetherError::DeviceTransfer {
                device: self.id.clone(),
                message: "connection reset".to_string(),
            });
        }
        self.record(format!("transfer_files:{}", files.len()));
        self.transfers.lock().unwrap().push(files.to_vec());
        Ok(())
    }

    fn transfer_directory(
        &self,
        _app_id: &str,
        source: &Path,
        files: &[LocalToDevicePath],
    ) -> TetherResult<()> {
        self.record(format!("transfer_directory:{}", source.display()));
        self.transfers.lock().unwrap().push(files.to_vec());
        Ok(())
    }

    fn remove_files(&self, _app_id: &str, files: &[LocalToDevicePath]) -> TetherResult<()> {
        for file in files {
            self.record(format!("remove:{}", file.relative_path));
        }
        Ok(())
    }

    fn reload_application(&self, _app_id: &str) -> TetherResult<()> {
        self.record("reload");
        Ok(())
    }

    fn sync_root(&self, app_id: &str) -> String {
        format!("/data/local/tmp/{app_id}")
    }

    fn open_inspector(&self) -> TetherResult<Box<dyn Write + Send>> {
        if self.fail_inspector {
            return Err(TetherError::InspectorSocket("connect timed out".to_string()));
        }
        self.record("inspector");
        Ok(Box::new(SharedSink(Arc::clone(&self.inspector))))
    }
}

/// In-memory platform builder with controllable stamps.
#[derive(Clone)]
pub struct MockBuilder {
    pub out: PathBuf,
    pub build_time: Arc<Mutex<Option<String>>>,
    pub builds: Arc<Mutex<Vec<(Platform, bool)>>>,
}

impl MockBuilder {
    pub fn new(out: &Path) -> MockBuilder {
        MockBuilder {
            out: out.to_path_buf(),
            build_time: Arc::new(Mutex::new(None)),
            builds: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn build_count(&self) -> usize {
        self.builds.lock().unwrap().len()
    }
}

impl PlatformBuilder for MockBuilder {
    fn build(&self, platform: Platform, for_device: bool, _release: bool) -> TetherResult<PathBuf> {
        self.builds.lock().unwrap().push((platform, for_device));
        self.latest_package(platform, for_device)
    }

    fn latest_package(&self, platform: Platform, for_device: bool) -> TetherResult<PathBuf> {
        Ok(self
            .build_output_dir(platform, for_device)
            .join("app-package"))
    }

    fn latest_build_time(&self, _platform: Platform, _for_device: bool) -> Option<String> {
        self.build_time.lock().unwrap().clone()
    }

    fn build_output_dir(&self, platform: Platform, for_device: bool) -> PathBuf {
        let variant = if for_device { "device" } else { "emulator" };
        self.out.join(format!("{}-{variant}", platform.name()))
    }
}
