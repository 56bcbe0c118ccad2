//! Error types for artifact and binary cache operations.

use std::path::PathBuf;

/// Errors that can occur while reading, merging or writing build state.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing a cache file.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An existing artifact file is not a JSON object.
    ///
    /// Never silently replaced, since it may hold deployment records.
    #[error("failed to parse artifact {path}: {reason}")]
    ArtifactParse {
        /// The artifact file path.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// A serialization error occurred.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },

    /// The compiler output holds no symbol named after the unit's file.
    #[error("no compiler output for `{symbol}` in {unit}; the contract name must match its file name")]
    OutputMissing {
        /// Reference path of the unit.
        unit: String,
        /// The expected symbol name.
        symbol: String,
    },
}
