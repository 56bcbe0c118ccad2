//! Persistent build state: artifacts and the compiler binary cache.
//!
//! Artifacts are one JSON record per compiled unit, merged across builds so
//! that deployment metadata written by other tools survives recompilation.
//! The binary cache keeps downloaded compiler builds on disk, validated by
//! checksum before reuse.

#![warn(missing_docs)]

pub mod artifact;
pub mod binary;
pub mod error;
pub mod merge;
pub mod store;

pub use artifact::{
    Artifact, Bytecode, CompilerIdentity, ContractOutput, EvmOutput, SourceEntry, SCHEMA_VERSION,
};
pub use binary::{BinaryCache, BinaryMeta};
pub use error::CacheError;
pub use merge::{merge, MergeInput};
pub use store::{to_json, ArtifactStore};
