//! Property tests for the delta planner: apply-safety and idempotence.

use proptest::prelude::*;
use tempfile::TempDir;

use crate::common::write;
use tether::delta::rebuild_delta;
use tether::graph::build_graph;
use tether::inventory::build_inventory;
use tether::platform::dir_chain;
use tether::{LocalStore, Platform, TargetLayout};

/// Safe relative file paths: one or two short alphanumeric segments
/// plus a `.js` leaf.
fn file_paths() -> impl Strategy<Value = Vec<String>> {
    let segment = proptest::string::string_regex("[a-z][a-z0-9]{0,6}").unwrap();
    let path = (proptest::collection::vec(segment, 1..3), "[a-z]{1,6}")
        .prop_map(|(dirs, leaf)| format!("{}/{leaf}.js", dirs.join("/")));
    proptest::collection::vec(path, 0..8)
}

fn project_with_app_files(files: &[String]) -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "package.json", r#"{"version": "1.0.0"}"#);
    write(dir.path(), "app/main.js", "main");
    for (index, rel) in files.iter().enumerate() {
        write(dir.path(), &format!("app/{rel}"), &format!("content {index}"));
    }
    dir
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 48,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: every proper directory prefix of every copy target is
    /// either on disk already or appears in the sorted mkdir list.
    #[test]
    fn property_copy_prefixes_are_covered(files in file_paths()) {
        let dir = project_with_app_files(&files);
        let mut graph = build_graph(&LocalStore, dir.path()).unwrap();
        build_inventory(&LocalStore, dir.path(), &mut graph).unwrap();
        let layout = TargetLayout::for_platform(Platform::Android, dir.path());

        let delta = rebuild_delta(&LocalStore, dir.path(), &graph, Platform::Android, &layout, &mut |_| {}).unwrap();

        for target in delta.copy.keys() {
            let parent = target.rsplit_once('/').map(|(p, _)| p).unwrap_or("");
            for prefix in dir_chain(parent) {
                let on_disk = dir.path().join(prefix.trim_end_matches('/')).is_dir();
                prop_assert!(
                    delta.mkdir.contains(&prefix) || on_disk,
                    "uncovered prefix {} for {}", prefix, target
                );
            }
        }
    }

    /// PROPERTY: apply then re-plan yields an empty delta (idempotence).
    #[test]
    fn property_apply_then_replan_is_empty(files in file_paths()) {
        let dir = project_with_app_files(&files);
        let mut graph = build_graph(&LocalStore, dir.path()).unwrap();
        build_inventory(&LocalStore, dir.path(), &mut graph).unwrap();
        let layout = TargetLayout::for_platform(Platform::Android, dir.path());

        let delta = rebuild_delta(&LocalStore, dir.path(), &graph, Platform::Android, &layout, &mut |_| {}).unwrap();
        delta.apply(&LocalStore, dir.path()).unwrap();

        let replanned = rebuild_delta(&LocalStore, dir.path(), &graph, Platform::Android, &layout, &mut |_| {}).unwrap();
        prop_assert!(replanned.copy.is_empty(), "copies: {:?}", replanned.copy.keys());
        prop_assert!(replanned.rmfile.is_empty());
        prop_assert!(replanned.rmdir.is_empty());
        prop_assert!(replanned.mkdir.is_empty(), "mkdirs: {:?}", replanned.mkdir);
    }

    /// PROPERTY: the delta never lists a path in both a create set and
    /// its opposing delete set.
    #[test]
    fn property_delta_is_self_consistent(files in file_paths()) {
        let dir = project_with_app_files(&files);
        // leave stale output behind to exercise the delete sets
        write(dir.path(), "platforms/android/src/main/assets/app/stale/gone.js", "stale");

        let mut graph = build_graph(&LocalStore, dir.path()).unwrap();
        build_inventory(&LocalStore, dir.path(), &mut graph).unwrap();
        let layout = TargetLayout::for_platform(Platform::Android, dir.path());
        let delta = rebuild_delta(&LocalStore, dir.path(), &graph, Platform::Android, &layout, &mut |_| {}).unwrap();

        for dir_entry in &delta.mkdir {
            prop_assert!(!delta.rmdir.contains(dir_entry));
        }
        for target in delta.copy.keys() {
            prop_assert!(!delta.rmfile.contains(target));
        }
    }
}
