//! The resolved source unit.

use serde::{Deserialize, Serialize};

/// A source file produced by the resolver chain.
///
/// Immutable once resolved; its identity is the reference path it was
/// resolved under, which is also the key used in compiler requests and in
/// the artifact's source maps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUnit {
    /// Reference path the unit was resolved under (e.g. `tokens/Token.sol`).
    pub path: String,
    /// Full source text.
    pub source: String,
}

impl SourceUnit {
    /// Creates a source unit.
    pub fn new(path: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }

    /// The unit name: file name without extension.
    pub fn name(&self) -> &str {
        solbuild_common::unit_name(&self.path)
    }
}
