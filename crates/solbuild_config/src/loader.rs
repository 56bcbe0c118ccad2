//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// File name of the project configuration.
pub const CONFIG_FILE: &str = "solbuild.toml";

/// Loads and validates a `solbuild.toml` configuration from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Like [`load_config`], but a missing file yields the default configuration.
pub fn load_config_or_default(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    match load_config(project_dir) {
        Err(ConfigError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            Ok(ProjectConfig::default())
        }
        other => other,
    }
}

/// Parses and validates a `solbuild.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Parses a semver value, naming `field` in the error.
pub(crate) fn parse_version(field: &str, value: &str) -> Result<semver::Version, ConfigError> {
    semver::Version::parse(value).map_err(|e| ConfigError::InvalidVersion {
        field: field.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Validates that configuration values are consistent.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.source_dir.is_empty() {
        return Err(ConfigError::ValidationError(
            "project.source_dir must not be empty".to_string(),
        ));
    }
    if config.project.artifacts_dir.is_empty() {
        return Err(ConfigError::ValidationError(
            "project.artifacts_dir must not be empty".to_string(),
        ));
    }
    if config.compiler.download_timeout == 0 {
        return Err(ConfigError::ValidationError(
            "compiler.download_timeout must be positive".to_string(),
        ));
    }
    if let Some(settings) = &config.compiler.settings {
        if !settings.is_object() {
            return Err(ConfigError::ValidationError(
                "compiler.settings must be a table".to_string(),
            ));
        }
    }
    if let Some(version) = &config.compiler.version {
        parse_version("compiler.version", version)?;
    }
    for (version, build) in &config.compiler.catalog {
        parse_version("compiler.catalog", version)?;
        if build.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "compiler.catalog entry for {version} has an empty build identifier"
            )));
        }
    }
    Ok(())
}
