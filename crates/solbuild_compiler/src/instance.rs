//! The compiler instance abstraction and the native process backend.

use async_trait::async_trait;
use semver::Version;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;

use solbuild_common::normalize_reference;
use solbuild_source::{imports, ResolverChain};

use crate::error::CompileError;
use crate::request::CompilerInput;

/// Answer to a compiler's request for a missing source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportResult {
    /// The source text.
    Contents(String),
    /// Why the source could not be supplied.
    Error(String),
}

/// Supplies sources the compiler asks for while compiling.
#[async_trait]
pub trait ImportCallback: Send + Sync {
    /// Looks up the source for `path`.
    async fn import(&self, path: &str) -> ImportResult;
}

#[async_trait]
impl ImportCallback for ResolverChain {
    async fn import(&self, path: &str) -> ImportResult {
        match self.resolve(path).await {
            Some(unit) => ImportResult::Contents(unit.source),
            None => ImportResult::Error(format!("File not found: {path}")),
        }
    }
}

/// A compiler that accepts standard JSON input and returns standard JSON
/// output.
#[async_trait]
pub trait CompilerInstance: Send + Sync {
    /// The compiler's version.
    fn version(&self) -> &Version;

    /// Compiles `input`, asking `callback` for any source it lacks.
    async fn compile(&self, input: &str, callback: &dyn ImportCallback) -> Result<String, CompileError>;
}

/// A native `solc` binary driven through `--standard-json`.
///
/// The native process cannot call back into the host, so every import
/// reachable from the request is inlined before spawning.
#[derive(Debug, Clone)]
pub struct SolcProcess {
    path: PathBuf,
    version: Version,
}

impl SolcProcess {
    /// Wraps the binary at `path`.
    pub fn new(path: &Path, version: Version) -> Self {
        Self {
            path: path.to_path_buf(),
            version,
        }
    }

    /// Path of the wrapped binary.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Adds every source reachable from `input` through imports, asking
/// `callback` for the ones it lacks. Sources the callback cannot supply are
/// left out for the compiler to report.
pub async fn inline_imports(input: &mut CompilerInput, callback: &dyn ImportCallback) {
    let mut pending: Vec<String> = input.sources.keys().cloned().collect();
    while let Some(path) = pending.pop() {
        let Some(source) = input.sources.get(&path) else {
            continue;
        };
        let references: Vec<String> = imports(&source.content)
            .iter()
            .map(|r| normalize_reference(&path, r))
            .collect();
        for reference in references {
            if input.sources.contains_key(&reference) {
                continue;
            }
            match callback.import(&reference).await {
                ImportResult::Contents(content) => {
                    input.add_source(reference.clone(), content);
                    pending.push(reference);
                }
                ImportResult::Error(reason) => {
                    tracing::debug!(%reference, importer = %path, %reason, "import not supplied");
                }
            }
        }
    }
}

#[async_trait]
impl CompilerInstance for SolcProcess {
    fn version(&self) -> &Version {
        &self.version
    }

    async fn compile(&self, input: &str, callback: &dyn ImportCallback) -> Result<String, CompileError> {
        let mut request: CompilerInput =
            serde_json::from_str(input).map_err(|e| CompileError::CompilerProcess {
                path: self.path.clone(),
                reason: format!("malformed request: {e}"),
            })?;
        inline_imports(&mut request, callback).await;
        let payload = serde_json::to_vec(&request).map_err(|e| CompileError::CompilerProcess {
            path: self.path.clone(),
            reason: format!("cannot serialize request: {e}"),
        })?;

        let process_err = |reason: String| CompileError::CompilerProcess {
            path: self.path.clone(),
            reason,
        };

        tracing::debug!(
            path = %self.path.display(),
            sources = request.sources.len(),
            "spawning compiler"
        );
        let mut child = tokio::process::Command::new(&self.path)
            .arg("--standard-json")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| process_err(e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&payload)
                .await
                .map_err(|e| process_err(format!("writing request: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| process_err(e.to_string()))?;

        // solc exits non-zero on compile errors but still prints JSON.
        if output.stdout.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(process_err(format!(
                "exited with {} and no output: {}",
                output.status,
                stderr.trim()
            )));
        }

        String::from_utf8(output.stdout).map_err(|e| process_err(format!("non-UTF-8 output: {e}")))
    }
}
