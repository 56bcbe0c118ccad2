//! The resolver abstraction and the ordered fall-through chain.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;

use crate::fs::{FsResolver, RelativeFsResolver};
use crate::name::NameResolver;
use crate::npm::NpmResolver;
use crate::unit::SourceUnit;
use crate::url::UrlResolver;

/// A strategy for turning a reference path or unit name into source text.
///
/// Implementations return `None` when they cannot produce a source for the
/// reference, letting the next strategy in a [`ResolverChain`] try.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Attempts to resolve `reference`.
    async fn resolve(&self, reference: &str) -> Option<SourceUnit>;

    /// Lists every unit this strategy can enumerate.
    ///
    /// Most strategies only answer direct lookups and enumerate nothing.
    async fn list_all(&self) -> Vec<SourceUnit> {
        Vec::new()
    }
}

/// An ordered list of resolution strategies; the first hit wins.
#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Box<dyn Resolver>>,
}

impl ResolverChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the default chain for a project: URLs, then `node_modules`
    /// packages, then paths relative to the source directory, then paths as
    /// given, then bare unit names searched under the source directory.
    pub fn standard(project_root: &Path, source_dir: &Path) -> Self {
        Self::new()
            .with(UrlResolver::new())
            .with(NpmResolver::new(project_root))
            .with(RelativeFsResolver::new(source_dir))
            .with(FsResolver)
            .with(NameResolver::new(source_dir))
    }

    /// Appends a strategy with the lowest priority so far.
    pub fn with(mut self, resolver: impl Resolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    /// Appends a boxed strategy with the lowest priority so far.
    pub fn push(&mut self, resolver: Box<dyn Resolver>) {
        self.resolvers.push(resolver);
    }

    /// Number of strategies in the chain.
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Returns `true` if the chain holds no strategies.
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Resolves `reference` with the first strategy that knows it.
    pub async fn resolve(&self, reference: &str) -> Option<SourceUnit> {
        for resolver in &self.resolvers {
            if let Some(unit) = resolver.resolve(reference).await {
                tracing::trace!(reference, resolver = resolver.name(), path = %unit.path, "resolved");
                return Some(unit);
            }
        }
        tracing::debug!(reference, "no resolver could resolve reference");
        None
    }

    /// Enumerates every unit known to any strategy, deduplicated by path.
    ///
    /// Earlier strategies win on duplicate paths. The result is sorted by
    /// path so callers see a stable order.
    pub async fn list_all(&self) -> Vec<SourceUnit> {
        let mut seen = HashSet::new();
        let mut units = Vec::new();
        for resolver in &self.resolvers {
            for unit in resolver.list_all().await {
                if seen.insert(unit.path.clone()) {
                    units.push(unit);
                }
            }
        }
        units.sort_by(|a, b| a.path.cmp(&b.path));
        units
    }
}
