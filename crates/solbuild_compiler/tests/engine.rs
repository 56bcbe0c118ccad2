//! End-to-end builds against in-memory sources and a scripted compiler.
//!
//! The scripted compiler answers standard JSON requests without running
//! anything: every source gets a contract named after its file (or
//! `Misnamed` when the source says so), `ERROR` and `WARN` markers in the
//! text produce diagnostics, and every invocation is counted.

use async_trait::async_trait;
use semver::Version;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use solbuild_cache::Artifact;
use solbuild_common::{unit_name, SourceTreeHash};
use solbuild_compiler::{
    inline_imports, BuildReport, CompileError, CompilerInput, CompilerInstance, CompilerProvider, Engine,
    ImportCallback,
};
use solbuild_config::{resolve_build, BuildOptions, ProjectConfig};
use solbuild_diagnostics::DiagnosticSink;
use solbuild_source::{InMemoryResolver, ResolverChain};

// ---------------------------------------------------------------------------
// Scripted compiler
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Calls {
    count: AtomicUsize,
    versions: Mutex<Vec<Version>>,
}

struct ScriptedCompiler {
    version: Version,
    calls: Arc<Calls>,
}

#[async_trait]
impl CompilerInstance for ScriptedCompiler {
    fn version(&self) -> &Version {
        &self.version
    }

    async fn compile(&self, input: &str, callback: &dyn ImportCallback) -> Result<String, CompileError> {
        self.calls.count.fetch_add(1, Ordering::SeqCst);
        self.calls.versions.lock().unwrap().push(self.version.clone());

        let mut request: CompilerInput = serde_json::from_str(input).unwrap();
        inline_imports(&mut request, callback).await;

        let mut contracts = serde_json::Map::new();
        let mut sources = serde_json::Map::new();
        let mut errors = Vec::new();
        for (id, (path, source)) in request.sources.iter().enumerate() {
            let text = &source.content;
            if text.contains("ERROR") {
                errors.push(json!({
                    "severity": "error",
                    "type": "TypeError",
                    "message": "scripted failure",
                    "sourceLocation": {"file": path, "start": 0, "end": 1}
                }));
            }
            if text.contains("WARN") {
                errors.push(json!({"severity": "warning", "message": "scripted warning"}));
            }
            let symbol = if text.contains("contract Misnamed") {
                "Misnamed".to_string()
            } else {
                unit_name(path).to_string()
            };
            let code = SourceTreeHash::of_content(text.as_bytes()).to_string();
            let mut symbols = serde_json::Map::new();
            symbols.insert(
                symbol,
                json!({
                    "abi": [],
                    "evm": {
                        "bytecode": {"object": &code[..16]},
                        "deployedBytecode": {"object": &code[16..32]}
                    }
                }),
            );
            contracts.insert(path.clone(), Value::Object(symbols));
            sources.insert(path.clone(), json!({"id": id}));
        }

        Ok(json!({"contracts": contracts, "sources": sources, "errors": errors}).to_string())
    }
}

struct ScriptedProvider {
    calls: Arc<Calls>,
}

#[async_trait]
impl CompilerProvider for ScriptedProvider {
    fn available_versions(&self) -> Vec<Version> {
        vec![
            Version::new(0, 5, 17),
            Version::new(0, 6, 12),
            Version::new(0, 7, 6),
        ]
    }

    async fn get_compiler(&self, version: &Version) -> Result<Arc<dyn CompilerInstance>, CompileError> {
        if !self.available_versions().contains(version) {
            return Err(CompileError::UnknownCompilerVersion {
                version: version.clone(),
            });
        }
        Ok(Arc::new(ScriptedCompiler {
            version: version.clone(),
            calls: Arc::clone(&self.calls),
        }))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Project {
    dir: tempfile::TempDir,
    calls: Arc<Calls>,
}

impl Project {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            calls: Arc::new(Calls::default()),
        }
    }

    fn options(&self) -> BuildOptions {
        resolve_build(&ProjectConfig::default(), self.dir.path()).unwrap()
    }

    fn engine(&self, sources: &[(&str, &str)], options: BuildOptions) -> Engine {
        let mut resolver = InMemoryResolver::new();
        for (path, source) in sources {
            resolver.insert(*path, *source);
        }
        let provider = Arc::new(ScriptedProvider {
            calls: Arc::clone(&self.calls),
        });
        Engine::new(options, ResolverChain::new().with(resolver), provider)
    }

    async fn build(
        &self,
        sources: &[(&str, &str)],
        options: BuildOptions,
    ) -> Result<BuildReport, CompileError> {
        self.engine(sources, options)
            .build(&DiagnosticSink::new())
            .await
    }

    fn invocations(&self) -> usize {
        self.calls.count.load(Ordering::SeqCst)
    }

    fn artifact_path(&self, name: &str) -> PathBuf {
        self.dir.path().join("artifacts").join(format!("{name}.json"))
    }

    fn read_artifact(&self, name: &str) -> Artifact {
        let text = std::fs::read_to_string(self.artifact_path(name)).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    fn artifact_bytes(&self, name: &str) -> Vec<u8> {
        std::fs::read(self.artifact_path(name)).unwrap()
    }

    fn edit_artifact(&self, name: &str, edit: impl FnOnce(&mut Value)) {
        let path = self.artifact_path(name);
        let mut value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        edit(&mut value);
        std::fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    }

    fn artifact_files(&self) -> Vec<String> {
        let dir = self.dir.path().join("artifacts");
        if !dir.exists() {
            return Vec::new();
        }
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }
}

const TOKEN: &str = "pragma solidity ^0.6.0;\nimport \"./lib/Math.sol\";\ncontract Token {}\n";
const MATH: &str = "pragma solidity ^0.6.0;\nlibrary Math {}\n";
const LEGACY: &str = "pragma solidity ^0.5.0;\ncontract Legacy {}\n";

fn token_project() -> Vec<(&'static str, &'static str)> {
    vec![("Token.sol", TOKEN), ("lib/Math.sol", MATH)]
}

// ---------------------------------------------------------------------------
// Fresh builds
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_build_writes_one_artifact_per_unit() {
    let project = Project::new();
    let report = project.build(&token_project(), project.options()).await.unwrap();

    assert_eq!(project.invocations(), 1);
    assert_eq!(report.compiled.len(), 1);
    assert_eq!(report.compiled[0].version, Version::new(0, 6, 12));
    assert_eq!(report.compiled_units(), 2);
    assert_eq!(project.artifact_files(), ["Math.json", "Token.json"]);

    let token = project.read_artifact("Token");
    assert_eq!(token.contract_name, "Token");
    assert_eq!(token.schema_version, solbuild_cache::SCHEMA_VERSION);
    assert_eq!(token.compiler.name, "solc");
    assert_eq!(token.compiler.version, "0.6.12");
    assert!(token.networks.is_empty());
    assert!(token.source_tree_hash_hex.starts_with("0x"));
    assert_eq!(token.source_codes.len(), 2);
    assert_eq!(token.source_codes["lib/Math.sol"], MATH);
    assert!(token.sources.contains_key("lib/Math.sol"));

    let bytecode = token.compiler_output.evm.bytecode.unwrap().object;
    assert!(bytecode.starts_with("0x"));
    let deployed = token.compiler_output.evm.deployed_bytecode.unwrap().object;
    assert!(deployed.starts_with("0x"));
}

#[tokio::test]
async fn unchanged_rebuild_compiles_nothing_and_keeps_bytes() {
    let project = Project::new();
    project.build(&token_project(), project.options()).await.unwrap();
    let before = project.artifact_bytes("Token");

    let report = project.build(&token_project(), project.options()).await.unwrap();
    assert_eq!(project.invocations(), 1);
    assert!(report.compiled.is_empty());
    assert_eq!(report.fresh.len(), 2);
    assert_eq!(project.artifact_bytes("Token"), before);
}

#[tokio::test]
async fn dependency_change_recompiles_dependents() {
    let project = Project::new();
    project.build(&token_project(), project.options()).await.unwrap();
    let before = project.read_artifact("Token").source_tree_hash_hex;

    let math = "pragma solidity ^0.6.0;\nlibrary Math {} \n";
    let report = project
        .build(&[("Token.sol", TOKEN), ("lib/Math.sol", math)], project.options())
        .await
        .unwrap();
    assert_eq!(report.compiled_units(), 2);
    assert_ne!(project.read_artifact("Token").source_tree_hash_hex, before);
}

#[tokio::test]
async fn selected_units_only() {
    let project = Project::new();
    let mut options = project.options();
    options.units = Some(vec!["Token".to_string()]);
    project.build(&token_project(), options).await.unwrap();
    assert_eq!(project.artifact_files(), ["Token.json"]);
}

#[tokio::test]
async fn same_named_units_build_once_and_stay_fresh() {
    let project = Project::new();
    let sources = [
        ("a/Token.sol", "pragma solidity ^0.6.0;\ncontract Token {}\n"),
        ("b/Token.sol", "pragma solidity ^0.6.0;\ncontract Token { }\n"),
    ];
    let report = project.build(&sources, project.options()).await.unwrap();
    assert_eq!(report.compiled_units(), 1);
    assert_eq!(project.artifact_files(), ["Token.json"]);
    assert!(project
        .read_artifact("Token")
        .source_codes
        .contains_key("b/Token.sol"));

    let before = project.artifact_bytes("Token");
    for _ in 0..2 {
        let report = project.build(&sources, project.options()).await.unwrap();
        assert!(report.compiled.is_empty());
        assert_eq!(report.fresh, ["Token"]);
    }
    assert_eq!(project.invocations(), 1);
    assert_eq!(project.artifact_bytes("Token"), before);
}

// ---------------------------------------------------------------------------
// Artifact merging
// ---------------------------------------------------------------------------

#[tokio::test]
async fn networks_survive_a_settings_only_recompile() {
    let project = Project::new();
    project.build(&token_project(), project.options()).await.unwrap();
    project.edit_artifact("Token", |v| {
        v["networks"] = json!({"1": {"address": "0xabc"}});
    });

    let mut options = project.options();
    options.settings["optimizer"] = json!({"enabled": true, "runs": 200});
    let report = project.build(&token_project(), options).await.unwrap();
    assert_eq!(report.compiled_units(), 2);
    assert_eq!(project.invocations(), 2);

    let token = project.read_artifact("Token");
    assert_eq!(token.networks["1"], json!({"address": "0xabc"}));
    assert_eq!(token.compiler.settings["optimizer"]["runs"], json!(200));
}

#[tokio::test]
async fn old_schema_is_upgraded_keeping_unknown_fields() {
    let project = Project::new();
    project.build(&token_project(), project.options()).await.unwrap();
    project.edit_artifact("Token", |v| {
        v["schemaVersion"] = json!("1.0.0");
        v["updatedAt"] = json!("2019-01-01T00:00:00Z");
    });

    let report = project.build(&token_project(), project.options()).await.unwrap();
    assert_eq!(report.compiled_units(), 1);
    assert_eq!(report.fresh, ["Math"]);

    let token = project.read_artifact("Token");
    assert_eq!(token.schema_version, solbuild_cache::SCHEMA_VERSION);
    assert_eq!(token.extra["updatedAt"], json!("2019-01-01T00:00:00Z"));
}

// ---------------------------------------------------------------------------
// Version selection and batching
// ---------------------------------------------------------------------------

#[tokio::test]
async fn batches_run_in_ascending_version_order() {
    let project = Project::new();
    let sources = [("Token.sol", TOKEN), ("lib/Math.sol", MATH), ("Legacy.sol", LEGACY)];
    let report = project.build(&sources, project.options()).await.unwrap();

    let versions: Vec<_> = report.compiled.iter().map(|b| b.version.clone()).collect();
    assert_eq!(versions, [Version::new(0, 5, 17), Version::new(0, 6, 12)]);
    assert_eq!(report.compiled[0].units, ["Legacy"]);
    assert_eq!(
        *project.calls.versions.lock().unwrap(),
        [Version::new(0, 5, 17), Version::new(0, 6, 12)]
    );
}

#[tokio::test]
async fn no_satisfying_version_touches_nothing() {
    let project = Project::new();
    project.build(&token_project(), project.options()).await.unwrap();
    let before = project.artifact_bytes("Token");

    let changed = "pragma solidity ^0.6.0;\nimport \"./lib/Math.sol\";\ncontract Token { }\n";
    let sources = [
        ("Token.sol", changed),
        ("lib/Math.sol", MATH),
        ("Future.sol", "pragma solidity ^0.9.0;\ncontract Future {}\n"),
    ];
    let err = project.build(&sources, project.options()).await.unwrap_err();
    match err {
        CompileError::NoSatisfyingVersion { unit, constraint } => {
            assert_eq!(unit, "Future.sol");
            assert_eq!(constraint, "^0.9.0");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(project.invocations(), 1);
    assert_eq!(project.artifact_files(), ["Math.json", "Token.json"]);
    assert_eq!(project.artifact_bytes("Token"), before);
}

#[tokio::test]
async fn version_override_skips_selection() {
    let project = Project::new();
    let mut options = project.options();
    options.compiler_version = Some(Version::new(0, 7, 6));
    let report = project
        .build(&[("Plain.sol", "contract Plain {}\n")], options)
        .await
        .unwrap();
    assert_eq!(report.compiled[0].version, Version::new(0, 7, 6));
    assert_eq!(project.read_artifact("Plain").compiler.version, "0.7.6");
}

#[tokio::test]
async fn missing_pragma_without_override_fails() {
    let project = Project::new();
    let err = project
        .build(&[("Plain.sol", "contract Plain {}\n")], project.options())
        .await
        .unwrap_err();
    assert!(matches!(err, CompileError::MissingVersionPragma { .. }));
    assert_eq!(project.invocations(), 0);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fatal_diagnostic_fails_only_its_batch() {
    let project = Project::new();
    let sources = [
        ("Legacy.sol", LEGACY),
        ("Broken.sol", "pragma solidity ^0.6.0;\ncontract Broken { ERROR }\n"),
    ];
    let sink = DiagnosticSink::new();
    let err = project
        .engine(&sources, project.options())
        .build(&sink)
        .await
        .unwrap_err();

    assert!(matches!(err, CompileError::CompilationFailed { .. }));
    assert!(sink.has_errors());
    assert_eq!(sink.diagnostics()[0].kind.as_deref(), Some("TypeError"));
    // The 0.5 batch ran first and stays written.
    assert_eq!(project.artifact_files(), ["Legacy.json"]);
}

#[tokio::test]
async fn warnings_do_not_fail_the_build() {
    let project = Project::new();
    let sink = DiagnosticSink::new();
    project
        .engine(
            &[("Noisy.sol", "pragma solidity ^0.6.0;\ncontract Noisy { WARN }\n")],
            project.options(),
        )
        .build(&sink)
        .await
        .unwrap();
    assert!(!sink.has_errors());
    assert_eq!(sink.diagnostics().len(), 1);
    assert_eq!(project.artifact_files(), ["Noisy.json"]);
}

#[tokio::test]
async fn misnamed_contract_writes_nothing_for_the_batch() {
    let project = Project::new();
    let sources = [
        ("Good.sol", "pragma solidity ^0.6.0;\ncontract Good {}\n"),
        ("Odd.sol", "pragma solidity ^0.6.0;\ncontract Misnamed {}\n"),
    ];
    let err = project.build(&sources, project.options()).await.unwrap_err();
    match err {
        CompileError::OutputMissing { unit, symbol } => {
            assert_eq!(unit, "Odd.sol");
            assert_eq!(symbol, "Odd");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(project.artifact_files().is_empty());
}

#[tokio::test]
async fn cyclic_imports_fail() {
    let project = Project::new();
    let sources = [
        ("A.sol", "pragma solidity ^0.6.0;\nimport \"./B.sol\";\ncontract A {}\n"),
        ("B.sol", "pragma solidity ^0.6.0;\nimport \"./A.sol\";\ncontract B {}\n"),
    ];
    let err = project.build(&sources, project.options()).await.unwrap_err();
    assert!(matches!(err, CompileError::CyclicDependency { .. }));
    assert_eq!(project.invocations(), 0);
}

#[tokio::test]
async fn unresolved_import_fails() {
    let project = Project::new();
    let sources = [("Token.sol", TOKEN)];
    let err = project.build(&sources, project.options()).await.unwrap_err();
    assert!(matches!(
        err,
        CompileError::UnresolvedReference { ref reference, .. } if reference == "lib/Math.sol"
    ));
}

#[tokio::test]
async fn unknown_requested_unit_fails() {
    let project = Project::new();
    let mut options = project.options();
    options.units = Some(vec!["Nope".to_string()]);
    let err = project.build(&token_project(), options).await.unwrap_err();
    assert!(matches!(err, CompileError::UnknownUnit { ref name } if name == "Nope"));
}

#[tokio::test]
async fn unreadable_artifact_is_not_replaced() {
    let project = Project::new();
    let dir = project.dir.path().join("artifacts");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("Math.json"), "{ truncated").unwrap();

    let err = project.build(&token_project(), project.options()).await.unwrap_err();
    assert!(matches!(err, CompileError::Cache(_)));
    assert_eq!(
        std::fs::read_to_string(dir.join("Math.json")).unwrap(),
        "{ truncated"
    );
    assert!(!dir.join("Token.json").exists());
}
