//! Resolution of a parsed configuration into absolute build options.

use crate::error::ConfigError;
use crate::loader::parse_version;
use crate::types::ProjectConfig;
use semver::Version;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Fully resolved options for one build, with paths anchored at the
/// project root and versions parsed.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// The project root directory.
    pub project_root: PathBuf,
    /// Absolute directory holding the source units.
    pub source_dir: PathBuf,
    /// Absolute directory receiving artifacts.
    pub artifacts_dir: PathBuf,
    /// Absolute directory caching compiler binaries.
    pub cache_dir: PathBuf,
    /// Base URL for compiler downloads, always ending in `/`.
    pub binaries_url: String,
    /// Timeout applied to each compiler download.
    pub download_timeout: Duration,
    /// Explicit compiler version, bypassing per-unit selection.
    pub compiler_version: Option<Version>,
    /// Settings object sent with every compile request.
    pub settings: Value,
    /// Extra catalog entries layered over the built-in catalog.
    pub catalog: BTreeMap<Version, String>,
    /// Units to build; `None` builds everything discovered.
    pub units: Option<Vec<String>>,
}

/// Returns the default compiler settings: optimizer disabled and the
/// minimal output selection (interface and both bytecode objects).
pub fn default_compiler_settings() -> Value {
    json!({
        "optimizer": { "enabled": false },
        "outputSelection": default_output_selection(),
    })
}

fn default_output_selection() -> Value {
    json!({
        "*": {
            "*": ["abi", "evm.bytecode.object", "evm.deployedBytecode.object"]
        }
    })
}

fn anchor(root: &Path, dir: &str) -> PathBuf {
    let path = Path::new(dir);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Resolves `config` against `project_root`.
///
/// User-supplied settings replace the defaults wholesale, except that a
/// missing `outputSelection` is filled in so artifacts always carry the
/// interface and bytecode.
pub fn resolve_build(
    config: &ProjectConfig,
    project_root: &Path,
) -> Result<BuildOptions, ConfigError> {
    let settings = match &config.compiler.settings {
        Some(Value::Object(user)) => {
            let mut settings = user.clone();
            settings
                .entry("outputSelection")
                .or_insert_with(default_output_selection);
            Value::Object(settings)
        }
        Some(_) => {
            return Err(ConfigError::ValidationError(
                "compiler.settings must be a table".to_string(),
            ))
        }
        None => default_compiler_settings(),
    };

    let compiler_version = config
        .compiler
        .version
        .as_deref()
        .map(|v| parse_version("compiler.version", v))
        .transpose()?;

    let mut catalog = BTreeMap::new();
    for (version, build) in &config.compiler.catalog {
        catalog.insert(parse_version("compiler.catalog", version)?, build.clone());
    }

    let mut binaries_url = config.compiler.binaries_url.clone();
    if !binaries_url.ends_with('/') {
        binaries_url.push('/');
    }

    // Any "*" entry means every discovered unit.
    let units = &config.project.units;
    let units = (!units.is_empty() && !units.iter().any(|u| u == "*")).then(|| units.clone());

    Ok(BuildOptions {
        project_root: project_root.to_path_buf(),
        source_dir: anchor(project_root, &config.project.source_dir),
        artifacts_dir: anchor(project_root, &config.project.artifacts_dir),
        cache_dir: anchor(project_root, &config.compiler.cache_dir),
        binaries_url,
        download_timeout: Duration::from_secs(config.compiler.download_timeout),
        compiler_version,
        settings,
        catalog,
        units,
    })
}
