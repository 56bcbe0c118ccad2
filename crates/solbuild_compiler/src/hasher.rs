//! Dependency graph collection and source tree hashing.
//!
//! Collection resolves every distinct reference once through the
//! [`ResolverChain`], walking imports with an explicit worklist. Hashing then
//! walks the graph depth-first with an explicit stack, memoizing shared
//! dependencies and detecting cycles, so neither pass recurses.

use std::collections::{BTreeMap, HashMap, HashSet};

use solbuild_common::{normalize_reference, SourceTreeHash};
use solbuild_source::{imports, ResolverChain, SourceUnit};

use crate::error::CompileError;

#[derive(Debug, Clone)]
struct Node {
    unit: SourceUnit,
    /// Normalized references in source order, first occurrence only.
    deps: Vec<String>,
}

/// Every unit reachable from a set of roots, keyed by reference path.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: BTreeMap<String, Node>,
}

impl DependencyGraph {
    /// Resolves the transitive imports of `roots` through `chain`.
    ///
    /// Roots are keyed by their own path. Dependencies are keyed by the
    /// reference as normalized against the importer, which is the name the
    /// compiler will ask for.
    pub async fn collect(chain: &ResolverChain, roots: &[SourceUnit]) -> Result<Self, CompileError> {
        let mut graph = Self::default();
        let mut pending: Vec<SourceUnit> = roots.to_vec();
        let mut queued: HashSet<String> = roots.iter().map(|u| u.path.clone()).collect();

        while let Some(unit) = pending.pop() {
            let mut deps = Vec::new();
            for reference in imports(&unit.source) {
                let key = normalize_reference(&unit.path, &reference);
                if deps.contains(&key) {
                    continue;
                }
                if queued.insert(key.clone()) {
                    let resolved = chain.resolve(&key).await.ok_or_else(|| {
                        CompileError::UnresolvedReference {
                            reference: key.clone(),
                            importer: unit.path.clone(),
                        }
                    })?;
                    pending.push(SourceUnit::new(key.clone(), resolved.source));
                }
                deps.push(key);
            }
            tracing::trace!(unit = %unit.path, deps = deps.len(), "collected imports");
            graph.nodes.insert(unit.path.clone(), Node { unit, deps });
        }

        Ok(graph)
    }

    /// Number of units in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph holds no units.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The unit stored under `path`.
    pub fn unit(&self, path: &str) -> Option<&SourceUnit> {
        self.nodes.get(path).map(|n| &n.unit)
    }

    /// Direct dependencies of `path` in source order.
    pub fn dependencies(&self, path: &str) -> &[String] {
        self.nodes.get(path).map_or(&[], |n| n.deps.as_slice())
    }

    /// `path` and every unit it transitively depends on, each once, in
    /// depth-first preorder.
    pub fn closure(&self, path: &str) -> Vec<&SourceUnit> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut stack = vec![path];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            out.push(&node.unit);
            for dep in node.deps.iter().rev() {
                stack.push(dep);
            }
        }
        out
    }

    /// Computes the source tree hash of `path` on its own.
    ///
    /// Use a [`TreeHasher`] to hash several units sharing dependencies.
    pub fn tree_hash(&self, path: &str) -> Result<SourceTreeHash, CompileError> {
        TreeHasher::new(self).hash(path)
    }
}

/// Computes source tree hashes over one graph, memoizing shared
/// dependencies across calls.
pub struct TreeHasher<'g> {
    graph: &'g DependencyGraph,
    memo: HashMap<&'g str, SourceTreeHash>,
}

impl<'g> TreeHasher<'g> {
    /// Creates a hasher with an empty memo.
    pub fn new(graph: &'g DependencyGraph) -> Self {
        Self {
            graph,
            memo: HashMap::new(),
        }
    }

    /// Hashes the unit stored under `path`.
    ///
    /// A unit with no dependencies hashes to the digest of its source;
    /// otherwise the digest of its source digest followed by the digests of
    /// its dependencies in source order.
    pub fn hash(&mut self, path: &str) -> Result<SourceTreeHash, CompileError> {
        let graph = self.graph;
        let (root, _) = graph
            .nodes
            .get_key_value(path)
            .ok_or_else(|| CompileError::UnknownUnit {
                name: path.to_string(),
            })?;
        if let Some(hash) = self.memo.get(root.as_str()) {
            return Ok(*hash);
        }

        // Each frame is (path, index of the next dependency to visit).
        let mut stack: Vec<(&'g str, usize)> = vec![(root.as_str(), 0)];
        let mut on_stack: HashSet<&'g str> = HashSet::from([root.as_str()]);

        while let Some(frame) = stack.last_mut() {
            let current = frame.0;
            let node = &graph.nodes[current];
            if let Some(dep) = node.deps.get(frame.1) {
                frame.1 += 1;
                let dep = dep.as_str();
                if self.memo.contains_key(dep) {
                    continue;
                }
                if on_stack.contains(dep) {
                    let start = stack.iter().position(|(p, _)| *p == dep).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        stack[start..].iter().map(|(p, _)| p.to_string()).collect();
                    cycle.push(dep.to_string());
                    return Err(CompileError::CyclicDependency { cycle });
                }
                on_stack.insert(dep);
                stack.push((dep, 0));
                continue;
            }

            let content = SourceTreeHash::of_content(node.unit.source.as_bytes());
            let deps: Vec<SourceTreeHash> = node
                .deps
                .iter()
                .map(|d| self.memo[d.as_str()])
                .collect();
            self.memo
                .insert(current, SourceTreeHash::combine(content, &deps));
            on_stack.remove(current);
            stack.pop();
        }

        Ok(self.memo[root.as_str()])
    }
}
