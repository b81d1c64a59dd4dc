//! The package manifest subset the engine depends on, plus version
//! comparison for tie-breaks.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{TetherError, TetherResult};
use crate::platform::Platform;
use crate::store::FileStore;

/// Name of a package descriptor file
pub const MANIFEST_NAME: &str = "package.json";

/// The parts of `package.json` the engine reads. Everything else is
/// carried by the installer and the toolchains.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    /// Optional framework block. Its presence marks a framework-aware
    /// package.
    #[serde(default)]
    pub nativescript: Option<FrameworkBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FrameworkBlock {
    #[serde(default)]
    pub id: Option<String>,
    /// Platform → version-spec the package ships native code for.
    #[serde(default)]
    pub platforms: BTreeMap<String, String>,
}

impl Manifest {
    /// Parse `path` as UTF-8 JSON, tolerating a UTF-8 BOM. A parse
    /// failure is fatal to the current rebuild.
    pub fn load(store: &dyn FileStore, path: &Path) -> TetherResult<Manifest> {
        let text = store.read_text(path)?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
        serde_json::from_str(text).map_err(|e| TetherError::ManifestParse {
            file: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn is_framework_package(&self) -> bool {
        self.nativescript.is_some()
    }

    pub fn framework_id(&self) -> Option<&str> {
        self.nativescript.as_ref().and_then(|f| f.id.as_deref())
    }

    /// Platforms the package declares native support for.
    pub fn declared_platforms(&self) -> Vec<Platform> {
        self.nativescript
            .as_ref()
            .map(|f| f.platforms.keys().filter_map(|k| Platform::from_name(k)).collect())
            .unwrap_or_default()
    }

    pub fn supports_platforms(&self) -> bool {
        !self.declared_platforms().is_empty()
    }
}

/// Compare two manifest versions. The ordering is total: two-component
/// versions get a `.0` patch, and anything unparseable sorts lowest.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    parse_lenient(a).cmp(&parse_lenient(b))
}

fn parse_lenient(version: &str) -> Option<semver::Version> {
    let trimmed = version.trim().trim_start_matches(['v', '=', '^', '~']);
    if let Ok(parsed) = semver::Version::parse(trimmed) {
        return Some(parsed);
    }
    // major.minor with the patch omitted
    let parts: Vec<&str> = trimmed.split('.').collect();
    if parts.len() == 2 {
        return semver::Version::parse(&format!("{}.{}.0", parts[0], parts[1])).ok();
    }
    None
}
