//! Running one compile request and classifying its diagnostics.

use semver::Version;
use solbuild_diagnostics::{Diagnostic, DiagnosticSink};

use crate::error::CompileError;
use crate::instance::ImportCallback;
use crate::provider::CompilerProvider;
use crate::request::{CompilerInput, CompilerOutput};

/// Submits requests to compilers obtained from a provider.
pub struct Invoker<'a> {
    provider: &'a dyn CompilerProvider,
    callback: &'a dyn ImportCallback,
    sink: &'a DiagnosticSink,
}

impl<'a> Invoker<'a> {
    /// Creates an invoker. `callback` answers the compiler's import
    /// requests; diagnostics go to `sink`.
    pub fn new(
        provider: &'a dyn CompilerProvider,
        callback: &'a dyn ImportCallback,
        sink: &'a DiagnosticSink,
    ) -> Self {
        Self {
            provider,
            callback,
            sink,
        }
    }

    /// Compiles `input` with `version`.
    ///
    /// Any diagnostic other than a warning fails the whole request with
    /// [`CompileError::CompilationFailed`] after the fatal diagnostics are
    /// emitted. Otherwise warnings are emitted and the output is returned
    /// with `0x`-prefixed bytecode.
    pub async fn invoke(
        &self,
        version: &Version,
        input: &CompilerInput,
    ) -> Result<CompilerOutput, CompileError> {
        let compiler = self.provider.get_compiler(version).await?;
        let request = serde_json::to_string(input).map_err(|e| CompileError::InvalidCompilerOutput {
            version: version.clone(),
            reason: format!("cannot serialize request: {e}"),
        })?;

        let raw = compiler.compile(&request, self.callback).await?;
        let mut output: CompilerOutput =
            serde_json::from_str(&raw).map_err(|e| CompileError::InvalidCompilerOutput {
                version: version.clone(),
                reason: e.to_string(),
            })?;

        let (fatal, warnings) = classify(&output, version);
        if !fatal.is_empty() {
            tracing::debug!(%version, errors = fatal.len(), "compilation failed");
            for diag in &fatal {
                self.sink.emit(diag.clone());
            }
            return Err(CompileError::CompilationFailed {
                version: version.clone(),
                errors: fatal,
            });
        }
        for diag in warnings {
            self.sink.emit(diag);
        }

        output.normalize_bytecode();
        Ok(output)
    }
}

/// Splits the output's diagnostics into fatal ones and warnings.
pub fn classify(output: &CompilerOutput, version: &Version) -> (Vec<Diagnostic>, Vec<Diagnostic>) {
    output
        .errors
        .iter()
        .map(|m| (m.is_fatal(), m.to_diagnostic(version)))
        .fold((Vec::new(), Vec::new()), |(mut fatal, mut warnings), (is_fatal, diag)| {
            if is_fatal {
                fatal.push(diag);
            } else {
                warnings.push(diag);
            }
            (fatal, warnings)
        })
}
