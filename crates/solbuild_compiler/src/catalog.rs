//! The catalog of known compiler builds: version → build identifier.
//!
//! Build identifiers are file names under the binaries base URL, e.g.
//! `solc-linux-amd64-v0.8.19+commit.7dd6d404`.

use semver::Version;
use std::collections::BTreeMap;

/// Built-in releases, one per supported minor line plus recent patches.
const BUILTIN: &[(u64, u64, u64, &str)] = &[
    (0, 4, 24, "e67f0147"),
    (0, 4, 26, "4563c3fc"),
    (0, 5, 0, "1d4f565a"),
    (0, 5, 16, "9c3226ce"),
    (0, 5, 17, "d19bba13"),
    (0, 6, 12, "27d51765"),
    (0, 7, 6, "7338295f"),
    (0, 8, 0, "c7dfd78e"),
    (0, 8, 19, "7dd6d404"),
    (0, 8, 20, "a1b79de6"),
    (0, 8, 21, "d9974bed"),
    (0, 8, 24, "e11b9ed9"),
    (0, 8, 26, "8a97fa7a"),
];

/// The set of compiler versions a build may select from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    builds: BTreeMap<Version, String>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in release list.
    pub fn builtin() -> Self {
        let builds = BUILTIN
            .iter()
            .map(|&(major, minor, patch, commit)| {
                (
                    Version::new(major, minor, patch),
                    format!("solc-linux-amd64-v{major}.{minor}.{patch}+commit.{commit}"),
                )
            })
            .collect();
        Self { builds }
    }

    /// Layers `overrides` on top, replacing built-in entries for the same
    /// version.
    pub fn with_overrides(mut self, overrides: &BTreeMap<Version, String>) -> Self {
        for (version, build) in overrides {
            self.builds.insert(version.clone(), build.clone());
        }
        self
    }

    /// Adds or replaces a single entry.
    pub fn insert(&mut self, version: Version, build: impl Into<String>) {
        self.builds.insert(version, build.into());
    }

    /// The build identifier for `version`, if known.
    pub fn build_id(&self, version: &Version) -> Option<&str> {
        self.builds.get(version).map(String::as_str)
    }

    /// All known versions in ascending order.
    pub fn versions(&self) -> Vec<Version> {
        self.builds.keys().cloned().collect()
    }

    /// Iterates `(version, build id)` pairs in ascending version order.
    pub fn iter(&self) -> impl Iterator<Item = (&Version, &str)> {
        self.builds.iter().map(|(v, b)| (v, b.as_str()))
    }

    /// Number of known versions.
    pub fn len(&self) -> usize {
        self.builds.len()
    }

    /// Returns `true` if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.builds.is_empty()
    }
}
