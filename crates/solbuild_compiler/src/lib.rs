//! Incremental, multi-version compilation of Solidity source units.
//!
//! The [`Engine`] hashes each requested unit together with its transitive
//! imports, reuses artifacts whose hash, settings and schema still match,
//! picks a compiler version per dirty unit from its `pragma solidity` range,
//! and compiles one batch per version through a [`CompilerProvider`].

#![warn(missing_docs)]

pub mod batcher;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod instance;
pub mod invoker;
pub mod pragma;
pub mod provider;
pub mod request;

pub use batcher::{group_by_version, staleness, Batch, PlannedUnit, StaleReason};
pub use catalog::Catalog;
pub use engine::{BuildReport, CompiledBatch, Engine};
pub use error::CompileError;
pub use hasher::{DependencyGraph, TreeHasher};
pub use instance::{inline_imports, CompilerInstance, ImportCallback, ImportResult, SolcProcess};
pub use invoker::{classify, Invoker};
pub use pragma::{select_version, VersionRange};
pub use provider::{BinaryFetcher, BinaryProvider, CompilerProvider, HttpFetcher};
pub use request::{CompilerInput, CompilerMessage, CompilerOutput, MessageLocation, SourceContent};
