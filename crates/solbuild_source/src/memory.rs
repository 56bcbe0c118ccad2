//! An in-memory resolver over a fixed map of sources.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::resolver::Resolver;
use crate::unit::SourceUnit;

/// Resolves references against an in-memory path → source map.
///
/// Answers both exact paths and bare unit names (`Token` finds
/// `tokens/Token.sol`), and enumerates every source it holds. Useful for
/// embedding generated sources and for tests.
#[derive(Clone, Debug, Default)]
pub struct InMemoryResolver {
    sources: BTreeMap<String, String>,
}

impl InMemoryResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a source, replacing any previous text at `path`.
    pub fn with_source(mut self, path: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }

    /// Adds or replaces a source in place.
    pub fn insert(&mut self, path: impl Into<String>, source: impl Into<String>) {
        self.sources.insert(path.into(), source.into());
    }
}

#[async_trait]
impl Resolver for InMemoryResolver {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn resolve(&self, reference: &str) -> Option<SourceUnit> {
        if let Some(source) = self.sources.get(reference) {
            return Some(SourceUnit::new(reference, source.clone()));
        }
        self.sources
            .iter()
            .find(|(path, _)| solbuild_common::unit_name(path) == reference)
            .map(|(path, source)| SourceUnit::new(path.clone(), source.clone()))
    }

    async fn list_all(&self) -> Vec<SourceUnit> {
        self.sources
            .iter()
            .map(|(path, source)| SourceUnit::new(path.clone(), source.clone()))
            .collect()
    }
}
