//! The persisted artifact record and the compiler output it embeds.
//!
//! Every field defaults when absent, so artifacts written by older schema
//! versions or by other tools still load; the build then notices the stale
//! schema version and recompiles while keeping the carried-over fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Current artifact schema version. Artifacts with any other version are
/// recompiled.
pub const SCHEMA_VERSION: &str = "2.0.0";

/// The persisted record for one compiled unit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Artifact schema version.
    #[serde(default)]
    pub schema_version: String,
    /// Name of the compiled symbol (the unit's file name without extension).
    #[serde(default)]
    pub contract_name: String,
    /// Interface and bytecode for the symbol.
    #[serde(default)]
    pub compiler_output: ContractOutput,
    /// Compiler-assigned source ids for every file in the unit's closure.
    #[serde(default)]
    pub sources: BTreeMap<String, SourceEntry>,
    /// Source text of every file in the unit's closure at compile time.
    #[serde(default)]
    pub source_codes: BTreeMap<String, String>,
    /// `0x`-prefixed source tree hash the artifact was built from.
    #[serde(default)]
    pub source_tree_hash_hex: String,
    /// Compiler name, version and the settings it ran with.
    #[serde(default)]
    pub compiler: CompilerIdentity,
    /// Deployment records keyed by network id. Owned by deployment tooling;
    /// only ever copied forward.
    #[serde(default)]
    pub networks: BTreeMap<String, Value>,
    /// Any other top-level fields, carried forward untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Compiler identity recorded in an artifact.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilerIdentity {
    /// Compiler name (`solc`).
    #[serde(default)]
    pub name: String,
    /// Compiler version used.
    #[serde(default)]
    pub version: String,
    /// Settings object of the request.
    #[serde(default)]
    pub settings: Value,
}

/// A compiler-assigned source id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Numeric id used in source maps.
    #[serde(default)]
    pub id: u64,
    /// Other per-source output (e.g. `ast` when selected).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Per-symbol compiler output.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractOutput {
    /// Interface description.
    #[serde(default)]
    pub abi: Value,
    /// EVM outputs.
    #[serde(default)]
    pub evm: EvmOutput,
    /// Other selected outputs (`devdoc`, `userdoc`, `metadata`, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// EVM-specific compiler output.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmOutput {
    /// Creation bytecode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytecode: Option<Bytecode>,
    /// Runtime bytecode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed_bytecode: Option<Bytecode>,
    /// Other EVM outputs (`methodIdentifiers`, `gasEstimates`, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A bytecode object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bytecode {
    /// Hex-encoded bytecode.
    #[serde(default)]
    pub object: String,
    /// Other bytecode outputs (`sourceMap`, `linkReferences`, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Bytecode {
    /// Ensures the hex payload carries a `0x` prefix.
    ///
    /// An empty object (abstract contracts, interfaces) stays `0x`.
    pub fn normalize_prefix(&mut self) {
        if !self.object.starts_with("0x") {
            self.object.insert_str(0, "0x");
        }
    }
}

impl ContractOutput {
    /// Ensures both bytecode objects carry a `0x` prefix.
    pub fn normalize_bytecode(&mut self) {
        if let Some(bytecode) = &mut self.evm.bytecode {
            bytecode.normalize_prefix();
        }
        if let Some(deployed) = &mut self.evm.deployed_bytecode {
            deployed.normalize_prefix();
        }
    }
}

impl Artifact {
    /// Serializes the artifact with every object's keys sorted, followed by
    /// a trailing newline, so identical artifacts are byte-identical.
    pub fn to_canonical_json(&self) -> Result<String, serde_json::Error> {
        // `Value` objects are ordered maps, so the round-trip sorts keys.
        let value = serde_json::to_value(self)?;
        let mut out = serde_json::to_string_pretty(&value)?;
        out.push('\n');
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Artifact {
        Artifact {
            schema_version: SCHEMA_VERSION.to_string(),
            contract_name: "Token".to_string(),
            compiler_output: ContractOutput {
                abi: json!([{"type": "function", "name": "totalSupply"}]),
                evm: EvmOutput {
                    bytecode: Some(Bytecode {
                        object: "0x6080".to_string(),
                        extra: BTreeMap::new(),
                    }),
                    deployed_bytecode: Some(Bytecode {
                        object: "0x6001".to_string(),
                        extra: BTreeMap::new(),
                    }),
                    extra: BTreeMap::new(),
                },
                extra: BTreeMap::new(),
            },
            sources: BTreeMap::from([(
                "Token.sol".to_string(),
                SourceEntry {
                    id: 0,
                    extra: BTreeMap::new(),
                },
            )]),
            source_codes: BTreeMap::from([(
                "Token.sol".to_string(),
                "contract Token {}".to_string(),
            )]),
            source_tree_hash_hex: "0xabc".to_string(),
            compiler: CompilerIdentity {
                name: "solc".to_string(),
                version: "0.6.12".to_string(),
                settings: json!({"optimizer": {"enabled": false}}),
            },
            networks: BTreeMap::from([("1".to_string(), json!({"address": "0xabc"}))]),
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn camel_case_field_names() {
        let value = serde_json::to_value(sample()).unwrap();
        assert!(value.get("schemaVersion").is_some());
        assert!(value.get("sourceTreeHashHex").is_some());
        assert!(value.get("sourceCodes").is_some());
        assert!(value["compilerOutput"]["evm"].get("deployedBytecode").is_some());
    }

    #[test]
    fn canonical_json_sorts_keys() {
        let json = sample().to_canonical_json().unwrap();
        let compiler = json.find("\"compiler\"").unwrap();
        let contract_name = json.find("\"contractName\"").unwrap();
        let schema = json.find("\"schemaVersion\"").unwrap();
        assert!(compiler < contract_name);
        assert!(contract_name < schema);
        assert!(json.ends_with("}\n"));
    }

    #[test]
    fn canonical_json_reparses_equal() {
        let artifact = sample();
        let json = artifact.to_canonical_json().unwrap();
        let back: Artifact = serde_json::from_str(&json).unwrap();
        assert_eq!(artifact, back);
    }

    #[test]
    fn unknown_fields_are_kept() {
        let value = json!({
            "schemaVersion": "1.0.0",
            "contractName": "Token",
            "networks": {"3": {"address": "0x1"}},
            "updatedAt": "2019-01-01",
        });
        let artifact: Artifact = serde_json::from_value(value).unwrap();
        assert_eq!(artifact.schema_version, "1.0.0");
        assert_eq!(artifact.extra["updatedAt"], json!("2019-01-01"));
        assert!(artifact.compiler_output.evm.bytecode.is_none());

        let back = serde_json::to_value(&artifact).unwrap();
        assert_eq!(back["updatedAt"], json!("2019-01-01"));
    }

    #[test]
    fn bytecode_prefix_normalization() {
        let mut output = ContractOutput {
            evm: EvmOutput {
                bytecode: Some(Bytecode {
                    object: "6080".to_string(),
                    extra: BTreeMap::new(),
                }),
                deployed_bytecode: Some(Bytecode {
                    object: "0x6001".to_string(),
                    extra: BTreeMap::new(),
                }),
                extra: BTreeMap::new(),
            },
            ..Default::default()
        };
        output.normalize_bytecode();
        assert_eq!(output.evm.bytecode.as_ref().unwrap().object, "0x6080");
        assert_eq!(output.evm.deployed_bytecode.as_ref().unwrap().object, "0x6001");
    }

    #[test]
    fn empty_bytecode_becomes_bare_prefix() {
        let mut bytecode = Bytecode::default();
        bytecode.normalize_prefix();
        assert_eq!(bytecode.object, "0x");
    }
}
