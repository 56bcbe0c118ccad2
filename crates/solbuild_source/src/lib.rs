//! Source units, dependency scanning, and the resolver chain.
//!
//! This crate turns reference paths and unit names into [`SourceUnit`]s
//! through an ordered [`ResolverChain`] of [`Resolver`] strategies, and
//! provides the lightweight scanner that extracts `import` references and
//! the `pragma solidity` version constraint from source text.

#![warn(missing_docs)]

pub mod fs;
pub mod memory;
pub mod name;
pub mod npm;
pub mod resolver;
pub mod scan;
pub mod unit;
pub mod url;

pub use fs::{FsResolver, RelativeFsResolver};
pub use memory::InMemoryResolver;
pub use name::NameResolver;
pub use npm::NpmResolver;
pub use resolver::{Resolver, ResolverChain};
pub use scan::{imports, strip_comments, version_pragma};
pub use unit::SourceUnit;
pub use url::UrlResolver;
