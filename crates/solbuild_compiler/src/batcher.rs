//! Cache invalidation and grouping of dirty units by compiler version.

use semver::Version;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use solbuild_cache::{Artifact, SCHEMA_VERSION};
use solbuild_common::SourceTreeHash;
use solbuild_source::SourceUnit;

use crate::request::CompilerInput;

/// Why a unit must be recompiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    /// No artifact exists yet.
    NoArtifact,
    /// The artifact was written by another schema version.
    SchemaVersion(String),
    /// The artifact was compiled with different settings.
    Settings,
    /// The unit or one of its dependencies changed.
    SourceTree,
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaleReason::NoArtifact => write!(f, "no artifact"),
            StaleReason::SchemaVersion(found) => write!(f, "schema version {found}"),
            StaleReason::Settings => write!(f, "settings changed"),
            StaleReason::SourceTree => write!(f, "sources changed"),
        }
    }
}

/// Decides whether `prior` can be reused for a unit hashing to `tree_hash`
/// under `settings`. Returns `None` when the artifact is fresh.
pub fn staleness(
    prior: Option<&Artifact>,
    tree_hash: &SourceTreeHash,
    settings: &Value,
) -> Option<StaleReason> {
    let Some(prior) = prior else {
        return Some(StaleReason::NoArtifact);
    };
    if prior.schema_version != SCHEMA_VERSION {
        return Some(StaleReason::SchemaVersion(prior.schema_version.clone()));
    }
    if &prior.compiler.settings != settings {
        return Some(StaleReason::Settings);
    }
    if prior.source_tree_hash_hex != tree_hash.to_prefixed_hex() {
        return Some(StaleReason::SourceTree);
    }
    None
}

/// A unit scheduled for compilation.
#[derive(Debug, Clone)]
pub struct PlannedUnit {
    /// The root unit.
    pub unit: SourceUnit,
    /// Its source tree hash.
    pub tree_hash: SourceTreeHash,
    /// The artifact it replaces, if any.
    pub prior: Option<Artifact>,
}

/// All units compiled together by one compiler version.
#[derive(Debug, Clone)]
pub struct Batch {
    /// The selected version.
    pub version: Version,
    /// Units in request order.
    pub units: Vec<PlannedUnit>,
    /// The request: one entry per unit plus the shared settings.
    pub input: CompilerInput,
}

impl Batch {
    /// Names of the units in the batch.
    pub fn unit_names(&self) -> Vec<&str> {
        self.units.iter().map(|p| p.unit.name()).collect()
    }
}

/// Groups units by their selected version, in ascending version order.
/// Units keep their relative order within a batch.
pub fn group_by_version(planned: Vec<(PlannedUnit, Version)>, settings: &Value) -> Vec<Batch> {
    let mut batches: BTreeMap<Version, Batch> = BTreeMap::new();
    for (unit, version) in planned {
        let batch = batches.entry(version.clone()).or_insert_with(|| Batch {
            version,
            units: Vec::new(),
            input: CompilerInput::new(settings.clone()),
        });
        batch
            .input
            .add_source(unit.unit.path.clone(), unit.unit.source.clone());
        batch.units.push(unit);
    }
    batches.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use solbuild_cache::CompilerIdentity;

    fn fresh_artifact(hash: &SourceTreeHash, settings: &Value) -> Artifact {
        Artifact {
            schema_version: SCHEMA_VERSION.to_string(),
            contract_name: "Token".to_string(),
            source_tree_hash_hex: hash.to_prefixed_hex(),
            compiler: CompilerIdentity {
                name: "solc".to_string(),
                version: "0.6.12".to_string(),
                settings: settings.clone(),
            },
            ..Default::default()
        }
    }

    fn planned(path: &str) -> PlannedUnit {
        let unit = SourceUnit::new(path, format!("contract {} {{}}", solbuild_common::unit_name(path)));
        PlannedUnit {
            tree_hash: SourceTreeHash::of_content(unit.source.as_bytes()),
            unit,
            prior: None,
        }
    }

    #[test]
    fn missing_artifact_is_stale() {
        let hash = SourceTreeHash::of_content(b"x");
        assert_eq!(staleness(None, &hash, &json!({})), Some(StaleReason::NoArtifact));
    }

    #[test]
    fn matching_artifact_is_fresh() {
        let hash = SourceTreeHash::of_content(b"x");
        let settings = json!({"optimizer": {"enabled": false}});
        let prior = fresh_artifact(&hash, &settings);
        assert_eq!(staleness(Some(&prior), &hash, &settings), None);
    }

    #[test]
    fn settings_compare_by_value() {
        let hash = SourceTreeHash::of_content(b"x");
        let prior = fresh_artifact(&hash, &json!({"a": 1, "b": {"c": true}}));
        let same: Value = serde_json::from_str(r#"{"b": {"c": true}, "a": 1}"#).unwrap();
        assert_eq!(staleness(Some(&prior), &hash, &same), None);
        assert_eq!(
            staleness(Some(&prior), &hash, &json!({"a": 2, "b": {"c": true}})),
            Some(StaleReason::Settings)
        );
    }

    #[test]
    fn old_schema_is_stale() {
        let hash = SourceTreeHash::of_content(b"x");
        let mut prior = fresh_artifact(&hash, &json!({}));
        prior.schema_version = "1.0.0".to_string();
        assert_eq!(
            staleness(Some(&prior), &hash, &json!({})),
            Some(StaleReason::SchemaVersion("1.0.0".to_string()))
        );
    }

    #[test]
    fn changed_tree_is_stale() {
        let prior = fresh_artifact(&SourceTreeHash::of_content(b"x"), &json!({}));
        assert_eq!(
            staleness(Some(&prior), &SourceTreeHash::of_content(b"y"), &json!({})),
            Some(StaleReason::SourceTree)
        );
    }

    #[test]
    fn batches_ascend_by_version() {
        let v5 = Version::new(0, 5, 17);
        let v6 = Version::new(0, 6, 12);
        let settings = json!({"optimizer": {"enabled": false}});
        let batches = group_by_version(
            vec![
                (planned("Token.sol"), v6.clone()),
                (planned("Legacy.sol"), v5.clone()),
                (planned("Exchange.sol"), v6.clone()),
            ],
            &settings,
        );

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].version, v5);
        assert_eq!(batches[0].unit_names(), ["Legacy"]);
        assert_eq!(batches[1].version, v6);
        assert_eq!(batches[1].unit_names(), ["Token", "Exchange"]);
        assert_eq!(batches[1].input.sources.len(), 2);
        assert_eq!(batches[1].input.settings, settings);
    }

    #[test]
    fn no_units_no_batches() {
        assert!(group_by_version(Vec::new(), &json!({})).is_empty());
    }
}
