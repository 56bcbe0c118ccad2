//! The build orchestrator.
//!
//! One build runs these phases in order:
//!
//! 1. Resolve the requested units (or enumerate all of them)
//! 2. Collect the dependency graph and hash every unit's source tree
//! 3. Compare against persisted artifacts to find dirty units
//! 4. Select a compiler version for every dirty unit
//! 5. Compile one batch per version, ascending, merging and writing artifacts
//!
//! Nothing is compiled until every dirty unit has a version, so a range no
//! compiler satisfies fails the build before any artifact changes. A failing
//! batch writes nothing; batches that finished earlier stay written.

use semver::Version;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use solbuild_cache::{merge, ArtifactStore, CompilerIdentity, MergeInput};
use solbuild_config::BuildOptions;
use solbuild_diagnostics::DiagnosticSink;
use solbuild_source::{ResolverChain, SourceUnit};

use crate::batcher::{group_by_version, staleness, Batch, PlannedUnit};
use crate::error::CompileError;
use crate::hasher::{DependencyGraph, TreeHasher};
use crate::invoker::Invoker;
use crate::pragma::select_version;
use crate::provider::{BinaryProvider, CompilerProvider};

/// Compiler name recorded in artifacts.
const COMPILER_NAME: &str = "solc";

/// Outcome of a successful build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    /// Batches compiled, in the order they ran.
    pub compiled: Vec<CompiledBatch>,
    /// Units whose artifacts were reused.
    pub fresh: Vec<String>,
}

impl BuildReport {
    /// Number of units compiled across all batches.
    pub fn compiled_units(&self) -> usize {
        self.compiled.iter().map(|b| b.units.len()).sum()
    }
}

/// One compiled version batch.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledBatch {
    /// Compiler version used.
    pub version: Version,
    /// Names of the units compiled.
    pub units: Vec<String>,
    /// Artifact files written.
    pub artifacts: Vec<PathBuf>,
}

/// Drives incremental builds for one project.
pub struct Engine {
    options: BuildOptions,
    resolvers: ResolverChain,
    provider: Arc<dyn CompilerProvider>,
    store: ArtifactStore,
}

impl Engine {
    /// Creates an engine with explicit collaborators.
    pub fn new(
        options: BuildOptions,
        resolvers: ResolverChain,
        provider: Arc<dyn CompilerProvider>,
    ) -> Self {
        let store = ArtifactStore::new(&options.artifacts_dir);
        Self {
            options,
            resolvers,
            provider,
            store,
        }
    }

    /// Creates an engine with the standard resolver chain and downloaded
    /// native compilers.
    pub fn from_options(options: BuildOptions) -> Self {
        let resolvers = ResolverChain::standard(&options.project_root, &options.source_dir);
        let provider = Arc::new(BinaryProvider::from_options(&options));
        Self::new(options, resolvers, provider)
    }

    /// The options this engine builds with.
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// The artifact store.
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Runs one build. Compiler diagnostics are emitted to `sink`.
    #[tracing::instrument(skip_all, fields(artifacts = %self.options.artifacts_dir.display()))]
    pub async fn build(&self, sink: &DiagnosticSink) -> Result<BuildReport, CompileError> {
        let roots = self.requested_units().await?;
        let graph = DependencyGraph::collect(&self.resolvers, &roots).await?;
        tracing::debug!(units = roots.len(), sources = graph.len(), "collected sources");

        let mut report = BuildReport::default();
        let mut dirty = Vec::new();
        let mut hasher = TreeHasher::new(&graph);
        for unit in roots {
            let tree_hash = hasher.hash(&unit.path)?;
            let prior = self.store.load(unit.name()).await?;
            match staleness(prior.as_ref(), &tree_hash, &self.options.settings) {
                None => {
                    tracing::debug!(unit = %unit.path, "artifact is fresh");
                    report.fresh.push(unit.name().to_string());
                }
                Some(reason) => {
                    tracing::debug!(unit = %unit.path, %reason, "recompiling");
                    dirty.push(PlannedUnit {
                        unit,
                        tree_hash,
                        prior,
                    });
                }
            }
        }

        let available = self.provider.available_versions();
        let mut planned = Vec::with_capacity(dirty.len());
        for unit in dirty {
            let version = match &self.options.compiler_version {
                Some(version) => version.clone(),
                None => select_version(&unit.unit, &available)?,
            };
            planned.push((unit, version));
        }

        let invoker = Invoker::new(self.provider.as_ref(), &self.resolvers, sink);
        for batch in group_by_version(planned, &self.options.settings) {
            report
                .compiled
                .push(self.compile_batch(&invoker, &graph, batch).await?);
        }

        tracing::info!(
            compiled = report.compiled_units(),
            fresh = report.fresh.len(),
            "build finished"
        );
        Ok(report)
    }

    /// Resolves the configured unit list, or every unit the chain can
    /// enumerate. Duplicates (by path) are dropped, and of two units sharing
    /// an artifact name only the later one is built.
    async fn requested_units(&self) -> Result<Vec<SourceUnit>, CompileError> {
        let units = match &self.options.units {
            Some(names) => {
                let mut units = Vec::with_capacity(names.len());
                for name in names {
                    let unit = self
                        .resolvers
                        .resolve(name)
                        .await
                        .ok_or_else(|| CompileError::UnknownUnit { name: name.clone() })?;
                    units.push(unit);
                }
                units
            }
            None => self.resolvers.list_all().await,
        };

        // Each artifact name maps to one slot in `out`; a later unit with the
        // same name takes over the slot.
        let mut paths = HashSet::new();
        let mut slots: BTreeMap<String, usize> = BTreeMap::new();
        let mut out: Vec<SourceUnit> = Vec::with_capacity(units.len());
        for unit in units {
            if !paths.insert(unit.path.clone()) {
                continue;
            }
            match slots.get(unit.name()) {
                Some(&slot) => {
                    tracing::warn!(
                        first = %out[slot].path,
                        second = %unit.path,
                        "two units share an artifact name; the later one wins"
                    );
                    out[slot] = unit;
                }
                None => {
                    slots.insert(unit.name().to_string(), out.len());
                    out.push(unit);
                }
            }
        }
        Ok(out)
    }

    #[tracing::instrument(skip_all, fields(version = %batch.version, units = batch.units.len()))]
    async fn compile_batch(
        &self,
        invoker: &Invoker<'_>,
        graph: &DependencyGraph,
        batch: Batch,
    ) -> Result<CompiledBatch, CompileError> {
        tracing::info!(units = ?batch.unit_names(), "compiling");
        let output = invoker.invoke(&batch.version, &batch.input).await?;
        let compiler = CompilerIdentity {
            name: COMPILER_NAME.to_string(),
            version: batch.version.to_string(),
            settings: self.options.settings.clone(),
        };

        // Merge the whole batch before writing anything.
        let mut merged = Vec::with_capacity(batch.units.len());
        for planned in batch.units {
            let closure = graph.closure(&planned.unit.path);
            let source_codes = closure
                .iter()
                .map(|u| (u.path.clone(), u.source.clone()))
                .collect();
            let source_ids = closure
                .iter()
                .filter_map(|u| {
                    output
                        .sources
                        .get(&u.path)
                        .map(|entry| (u.path.clone(), entry.clone()))
                })
                .collect();
            let input = MergeInput {
                unit_path: planned.unit.path.clone(),
                tree_hash: planned.tree_hash,
                compiler: compiler.clone(),
                source_codes,
                source_ids,
            };
            let artifact = merge(input, &output.contracts, planned.prior)?;
            merged.push((planned.unit.name().to_string(), artifact));
        }

        let mut artifacts = Vec::with_capacity(merged.len());
        for (name, artifact) in &merged {
            artifacts.push(self.store.save(name, artifact).await?);
        }

        Ok(CompiledBatch {
            version: batch.version,
            units: merged.into_iter().map(|(name, _)| name).collect(),
            artifacts,
        })
    }
}
