//! Scenario: a native file edit inside a framework package reroutes the
//! batch into a deploy cycle instead of a transfer.

use std::time::Duration;

use crate::common::{write, MockBuilder, MockDevice};
use tempfile::TempDir;

use tether::livesync::{FileEvent, LiveSyncCoordinator};
use tether::{LiveSyncOptions, LocalStore, Platform, Project};

fn project_with_native_dep() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "package.json",
        r#"{"version": "1.0.0", "nativescript": {"id": "org.example.app"}, "dependencies": {"nat": "1.0.0"}}"#,
    );
    write(dir.path(), "app/main.js", "main");
    write(
        dir.path(),
        "node_modules/nat/package.json",
        r#"{"name": "nat", "version": "1.0.0", "nativescript": {"platforms": {"android": "1.0.0"}}}"#,
    );
    write(dir.path(), "node_modules/nat/platforms/android/libfoo.so", "elf");
    dir
}

#[test]
fn scenario_native_edit_triggers_deploy_cycle() {
    let dir = project_with_native_dep();
    let project = Project::load(&LocalStore, dir.path()).unwrap();

    let device = MockDevice::new("emulator-5554", Platform::Android, true);
    let builder = MockBuilder::new(dir.path());

    let mut coordinator = LiveSyncCoordinator::new(
        &LocalStore,
        &project,
        LiveSyncOptions::default(),
        &builder,
        vec![Box::new(device.clone())],
        |_| {},
    )
    .unwrap()
    .with_quiet_interval(Duration::from_millis(10));

    coordinator
        .on_file_event(
            Platform::Android,
            FileEvent::Changed,
            &dir.path().join("node_modules/nat/platforms/android/libfoo.so"),
        )
        .unwrap();
    std::thread::sleep(Duration::from_millis(20));
    coordinator.poll();

    assert_eq!(builder.build_count(), 1, "deploy must rebuild");
    assert!(device.log_contains("install"));
    assert!(device.log_contains("restart"));
    assert!(
        device.transfers.lock().unwrap().is_empty(),
        "no hot transfer for build-requiring edits"
    );
}

#[test]
fn scenario_mixed_batch_is_entirely_rerouted() {
    let dir = project_with_native_dep();
    let project = Project::load(&LocalStore, dir.path()).unwrap();

    let device = MockDevice::new("emulator-5554", Platform::Android, true);
    let builder = MockBuilder::new(dir.path());

    let mut coordinator = LiveSyncCoordinator::new(
        &LocalStore,
        &project,
        LiveSyncOptions::default(),
        &builder,
        vec![Box::new(device.clone())],
        |_| {},
    )
    .unwrap()
    .with_quiet_interval(Duration::from_millis(10));

    // one hot-syncable edit and one native edit in the same window
    coordinator
        .on_file_event(Platform::Android, FileEvent::Changed, &dir.path().join("app/main.js"))
        .unwrap();
    coordinator
        .on_file_event(
            Platform::Android,
            FileEvent::Changed,
            &dir.path().join("node_modules/nat/platforms/android/libfoo.so"),
        )
        .unwrap();
    std::thread::sleep(Duration::from_millis(20));
    coordinator.poll();

    assert_eq!(builder.build_count(), 1);
    assert!(device.transfers.lock().unwrap().is_empty());
}

#[test]
fn scenario_app_resources_edit_is_skipped_with_a_warning() {
    let dir = project_with_native_dep();
    write(dir.path(), "app/App_Resources/android/icon.png", "png");
    let project = Project::load(&LocalStore, dir.path()).unwrap();

    let device = MockDevice::new("emulator-5554", Platform::Android, true);
    let builder = MockBuilder::new(dir.path());

    let warned = std::sync::Arc::new(std::sync::Mutex::new(false));
    let warned_sink = std::sync::Arc::clone(&warned);
    let mut coordinator = LiveSyncCoordinator::new(
        &LocalStore,
        &project,
        LiveSyncOptions::default(),
        &builder,
        vec![Box::new(device.clone())],
        move |event| {
            if matches!(event, tether::LiveSyncEvent::ResourceChangeNeedsFullBuild { .. }) {
                *warned_sink.lock().unwrap() = true;
            }
        },
    )
    .unwrap()
    .with_quiet_interval(Duration::from_millis(10));

    coordinator
        .on_file_event(
            Platform::Android,
            FileEvent::Changed,
            &dir.path().join("app/App_Resources/android/icon.png"),
        )
        .unwrap();
    std::thread::sleep(Duration::from_millis(20));
    coordinator.poll();

    assert!(*warned.lock().unwrap());
    assert_eq!(builder.build_count(), 0);
    assert!(device.transfers.lock().unwrap().is_empty());
}
