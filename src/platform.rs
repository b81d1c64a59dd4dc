//! Target platforms, their on-disk output layout, and path helpers.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Directory under the per-target app output holding flattened packages.
pub const MODULES_DIR_NAME: &str = "tns_modules";

/// The application's native resource directory under `app/`.
pub const APP_RESOURCES_DIR_NAME: &str = "App_Resources";

/// The application's script tree at the project root.
pub const APP_DIR_NAME: &str = "app";

/// Where installed packages live, at any nesting level.
pub const NODE_MODULES_DIR_NAME: &str = "node_modules";

/// Per-package native code directory.
pub const PLATFORMS_DIR_NAME: &str = "platforms";

/// A supported target platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Ios, Platform::Android];

    pub fn name(self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }

    /// The infix marking a file as specific to this platform, e.g.
    /// `page.ios.js` carries `.ios.`.
    pub fn suffix(self) -> String {
        format!(".{}.", self.name())
    }

    pub fn from_name(name: &str) -> Option<Platform> {
        match name.to_ascii_lowercase().as_str() {
            "ios" => Some(Platform::Ios),
            "android" => Some(Platform::Android),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::from_name(s).ok_or_else(|| format!("unknown platform '{s}' (expected ios or android)"))
    }
}

/// Per-target output directory layout, relative to the project root.
///
/// All paths are '/'-separated strings without trailing separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLayout {
    /// `platforms/<platform>`
    pub platform_root: String,
    /// Where the application's own script tree lands.
    pub app: String,
    /// Where flattened package scripts land.
    pub modules: String,
}

impl TargetLayout {
    pub fn for_platform(platform: Platform, project_dir: &Path) -> TargetLayout {
        let app = match platform {
            Platform::Ios => {
                let base = project_dir
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                format!("platforms/ios/{base}/app")
            }
            Platform::Android => "platforms/android/src/main/assets/app".to_string(),
        };
        TargetLayout {
            platform_root: format!("platforms/{}", platform.name()),
            modules: format!("{app}/{MODULES_DIR_NAME}"),
            app,
        }
    }
}

/// True when `file_name` carries the `.<platform>.` infix of a platform
/// other than `current`.
pub fn has_other_platform_suffix(file_name: &str, current: Platform) -> bool {
    Platform::ALL
        .iter()
        .any(|p| *p != current && file_name.contains(&p.suffix()))
}

/// Rewrite every `.<platform>.` occurrence to `.`.
pub fn strip_platform_suffix(path: &str, platform: Platform) -> String {
    path.replace(&platform.suffix(), ".")
}

/// Path made relative to `root`, '/'-separated regardless of host OS.
pub fn relative_string(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Every directory prefix of a '/'-separated relative path, each ending
/// in '/': `a/b/c` yields `a/`, `a/b/`, `a/b/c/`.
pub fn dir_chain(path: &str) -> Vec<String> {
    let mut chain = Vec::new();
    let mut prefix = String::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        prefix.push_str(segment);
        prefix.push('/');
        chain.push(prefix.clone());
    }
    chain
}
