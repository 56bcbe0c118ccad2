//! Error types for the compile pipeline.

use semver::Version;
use solbuild_cache::CacheError;
use solbuild_diagnostics::Diagnostic;
use std::path::PathBuf;

/// Errors that abort a build.
///
/// Warnings never surface here; they are emitted to the diagnostic sink and
/// the build continues.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// No catalog version satisfies the unit's declared range.
    #[error("no available compiler version satisfies `{constraint}` required by {unit}")]
    NoSatisfyingVersion {
        /// Reference path of the unit.
        unit: String,
        /// The declared version range.
        constraint: String,
    },

    /// The unit declares no `pragma solidity` range and no override is set.
    #[error("{unit} declares no `pragma solidity` version range")]
    MissingVersionPragma {
        /// Reference path of the unit.
        unit: String,
    },

    /// The unit's declared version range cannot be parsed.
    #[error("invalid version range `{constraint}` in {unit}: {reason}")]
    InvalidVersionConstraint {
        /// Reference path of the unit.
        unit: String,
        /// The declared version range.
        constraint: String,
        /// Description of the parse failure.
        reason: String,
    },

    /// The requested version has no known build.
    #[error("compiler version {version} is not in the catalog")]
    UnknownCompilerVersion {
        /// The requested version.
        version: Version,
    },

    /// Fetching a compiler build failed.
    #[error("failed to download {url}: {reason}")]
    DownloadFailed {
        /// The URL that was fetched.
        url: String,
        /// Transport error, timeout, or HTTP status.
        reason: String,
    },

    /// The compiler reported at least one fatal diagnostic.
    #[error("compilation with solc {version} failed with {} error(s)", errors.len())]
    CompilationFailed {
        /// Version of the failed batch.
        version: Version,
        /// The fatal diagnostics.
        errors: Vec<Diagnostic>,
    },

    /// The compiler output holds no symbol named after the unit's file.
    #[error("no compiler output for `{symbol}` in {unit}; the contract name must match its file name")]
    OutputMissing {
        /// Reference path of the unit.
        unit: String,
        /// The expected symbol name.
        symbol: String,
    },

    /// The dependency graph contains a cycle.
    #[error("cyclic dependency: {}", cycle.join(" -> "))]
    CyclicDependency {
        /// The references on the cycle, first and last equal.
        cycle: Vec<String>,
    },

    /// A dependency reference could not be resolved by any strategy.
    #[error("cannot resolve `{reference}` imported from {importer}")]
    UnresolvedReference {
        /// The normalized reference.
        reference: String,
        /// Reference path of the importing unit.
        importer: String,
    },

    /// A requested unit could not be resolved by any strategy.
    #[error("unknown unit `{name}`")]
    UnknownUnit {
        /// The requested name or path.
        name: String,
    },

    /// The compiler produced output that is not valid standard JSON.
    #[error("invalid compiler output from solc {version}: {reason}")]
    InvalidCompilerOutput {
        /// Version of the compiler.
        version: Version,
        /// Description of the parse failure.
        reason: String,
    },

    /// The compiler process could not be run or exited abnormally.
    #[error("failed to run compiler {path}: {reason}")]
    CompilerProcess {
        /// Path of the compiler binary.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// Reading or writing build state failed.
    #[error(transparent)]
    Cache(CacheError),

    /// Any other I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CacheError> for CompileError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::OutputMissing { unit, symbol } => Self::OutputMissing { unit, symbol },
            other => Self::Cache(other),
        }
    }
}
