//! Shared foundational types used across the solbuild toolchain.
//!
//! This crate provides the content hashes used for cache validation and
//! source-tree invalidation, plus helpers for naming compilation units.

#![warn(missing_docs)]

pub mod hash;
pub mod name;

pub use hash::{ContentHash, SourceTreeHash};
pub use name::{normalize_reference, unit_name};
