//! Merging fresh compiler output into persisted artifacts.
//!
//! A recompile replaces only what the compiler produces: the output, the
//! source ids and texts, the tree hash and the compiler identity. Everything
//! else in a prior artifact (deployment records, fields written by other
//! tools, the original contract name) is carried forward untouched, with
//! one exception: `schemaVersion` is set to [`SCHEMA_VERSION`]. The record
//! now holds current-schema output, and a carried-over old version would
//! mark the unit stale on every later build.

use std::collections::BTreeMap;

use solbuild_common::{unit_name, SourceTreeHash};

use crate::artifact::{Artifact, CompilerIdentity, ContractOutput, SourceEntry, SCHEMA_VERSION};
use crate::error::CacheError;

/// Everything the merger needs about one freshly compiled unit, apart from
/// the compiler output itself.
#[derive(Debug, Clone)]
pub struct MergeInput {
    /// Reference path of the unit in the compile request.
    pub unit_path: String,
    /// Source tree hash the unit was compiled from.
    pub tree_hash: SourceTreeHash,
    /// Compiler identity and settings used.
    pub compiler: CompilerIdentity,
    /// Text of every source in the unit's dependency closure.
    pub source_codes: BTreeMap<String, String>,
    /// Compiler-assigned ids for the sources in the closure.
    pub source_ids: BTreeMap<String, SourceEntry>,
}

/// Produces the artifact to persist for one unit.
///
/// `contracts` is the compiler output keyed by source path, then symbol.
/// The unit's own entry must hold a symbol named exactly after the unit's
/// file; otherwise [`CacheError::OutputMissing`] is returned and nothing
/// should be written.
pub fn merge(
    input: MergeInput,
    contracts: &BTreeMap<String, BTreeMap<String, ContractOutput>>,
    prior: Option<Artifact>,
) -> Result<Artifact, CacheError> {
    let symbol = unit_name(&input.unit_path);
    let output = contracts
        .get(&input.unit_path)
        .and_then(|symbols| symbols.get(symbol))
        .cloned()
        .ok_or_else(|| CacheError::OutputMissing {
            unit: input.unit_path.clone(),
            symbol: symbol.to_string(),
        })?;

    let mut artifact = match prior {
        Some(prior) => prior,
        None => Artifact {
            schema_version: SCHEMA_VERSION.to_string(),
            contract_name: symbol.to_string(),
            ..Default::default()
        },
    };

    artifact.compiler_output = output;
    artifact.sources = input.source_ids;
    artifact.source_codes = input.source_codes;
    artifact.source_tree_hash_hex = input.tree_hash.to_prefixed_hex();
    artifact.compiler = input.compiler;
    artifact.schema_version = SCHEMA_VERSION.to_string();
    if artifact.contract_name.is_empty() {
        artifact.contract_name = symbol.to_string();
    }

    Ok(artifact)
}
