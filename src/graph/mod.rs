//! Flattened dependency graph over the installed package tree.
//!
//! The tree is arena-backed: packages own their children by id, so
//! shadowing decisions can reach back to an earlier node without parent
//! pointers.

mod builder;

pub use builder::build_graph;

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::manifest::Manifest;
use crate::platform::Platform;

/// Where a package sits in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    /// The project root
    App,
    /// An installed dependency
    Package,
    /// A scoped sub-package discovered during inventory
    Nested,
}

/// Whether a package contributes files to the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Chosen to contribute files
    Available,
    /// No manifest on disk; contributes nothing. A state, not an error.
    NotInstalled,
    /// An ancestor already resolved this name
    ShadowedByAncestor,
    /// Lost a version tie-break against another branch
    ShadowedByDiverged,
}

/// A file discovered during inventory, with its path relative to the
/// enclosing scope root ('/'-separated).
#[derive(Debug, Clone)]
pub struct ScriptFile {
    pub path: String,
    pub absolute_path: PathBuf,
    pub name: String,
    pub extension: String,
    pub mtime_ms: i64,
}

/// Index of a package within its graph's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageId(pub(crate) usize);

/// A node in the dependency tree
#[derive(Debug, Clone)]
pub struct Package {
    pub kind: PackageKind,
    /// Unique within the set of Available packages
    pub name: String,
    /// Location relative to the project root
    pub path: PathBuf,
    pub manifest: Option<Manifest>,
    pub version: String,
    /// The version-spec the parent asked for
    pub required_version: String,
    pub availability: Availability,
    pub children: Vec<PackageId>,
    pub script_files: Vec<ScriptFile>,
    pub native_files: BTreeMap<Platform, Vec<ScriptFile>>,
    /// Directories under this package's scope, relative, each ending in
    /// '/'
    pub directories: Vec<String>,
}

impl Package {
    pub(crate) fn new(
        kind: PackageKind,
        name: impl Into<String>,
        path: PathBuf,
        required_version: impl Into<String>,
    ) -> Package {
        Package {
            kind,
            name: name.into(),
            path,
            manifest: None,
            version: String::new(),
            required_version: required_version.into(),
            availability: Availability::NotInstalled,
            children: Vec::new(),
            script_files: Vec::new(),
            native_files: BTreeMap::new(),
            directories: Vec::new(),
        }
    }
}

/// The flattened view of an installed tree
#[derive(Debug)]
pub struct PackageGraph {
    packages: Vec<Package>,
    pub app: PackageId,
    /// Exactly one entry per distinct name observed Available
    pub dependencies: BTreeMap<String, PackageId>,
}

impl PackageGraph {
    pub(crate) fn empty() -> PackageGraph {
        PackageGraph {
            packages: Vec::new(),
            app: PackageId(0),
            dependencies: BTreeMap::new(),
        }
    }

    pub(crate) fn push(&mut self, package: Package) -> PackageId {
        let id = PackageId(self.packages.len());
        self.packages.push(package);
        id
    }

    pub fn get(&self, id: PackageId) -> &Package {
        &self.packages[id.0]
    }

    pub fn get_mut(&mut self, id: PackageId) -> &mut Package {
        &mut self.packages[id.0]
    }

    pub fn app(&self) -> &Package {
        self.get(self.app)
    }

    pub fn app_mut(&mut self) -> &mut Package {
        self.get_mut(self.app)
    }

    /// Packages that contribute module files to the output: Available,
    /// and not the app itself.
    pub fn available_dependencies(&self) -> impl Iterator<Item = (&str, &Package)> {
        self.dependencies.iter().filter_map(|(name, id)| {
            let pack = self.get(*id);
            (pack.kind != PackageKind::App && pack.availability == Availability::Available)
                .then_some((name.as_str(), pack))
        })
    }

    /// Every package in the arena, for invariant checks and traversal.
    pub fn all_packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter()
    }
}
