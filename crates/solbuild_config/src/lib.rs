//! Parsing and validation of `solbuild.toml` project configuration files.
//!
//! This crate reads the optional project configuration file into a
//! [`ProjectConfig`] and resolves it against the project root into the
//! absolute, typed [`BuildOptions`] the compiler engine runs with.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, load_config_or_default, CONFIG_FILE};
pub use resolve::{default_compiler_settings, resolve_build, BuildOptions};
pub use types::*;
