//! Scenario: platform-suffixed files are rewritten for the current
//! target and excluded for every other target.

use tempfile::TempDir;

use crate::common::write;

use tether::{prepare_platform, LocalStore, Platform, PrepareOptions, Project};

fn suffixed_project() -> TempDir {
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
    write(dir.path(), "node_modules/foo/x.ios.js", "ios impl");
    write(dir.path(), "node_modules/foo/x.android.js", "android impl");
    dir
}

#[test]
fn scenario_ios_target_strips_its_suffix_and_drops_the_other() {
    let dir = suffixed_project();
    let base = dir.path().file_name().unwrap().to_string_lossy().into_owned();
    let project = Project::load(&LocalStore, dir.path()).unwrap();
    prepare_platform(&LocalStore, &project, Platform::Ios, PrepareOptions::default(), &mut |_| {})
        .unwrap();

    let modules = dir.path().join(format!("platforms/ios/{base}/app/tns_modules/foo"));
    assert_eq!(std::fs::read_to_string(modules.join("x.js")).unwrap(), "ios impl");
    assert!(!modules.join("x.ios.js").exists());
    assert!(!modules.join("x.android.js").exists());
}

#[test]
fn scenario_android_target_is_symmetric() {
    let dir = suffixed_project();
    let project = Project::load(&LocalStore, dir.path()).unwrap();
    prepare_platform(
        &LocalStore,
        &project,
        Platform::Android,
        PrepareOptions::default(),
        &mut |_| {},
    )
    .unwrap();

    let modules = dir
        .path()
        .join("platforms/android/src/main/assets/app/tns_modules/foo");
    assert_eq!(
        std::fs::read_to_string(modules.join("x.js")).unwrap(),
        "android impl"
    );
    assert!(!modules.join("x.ios.js").exists());
}
