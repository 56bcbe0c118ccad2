//! Shared helpers for CLI commands: locating the project, loading its
//! configuration and rendering diagnostics.

use std::path::{Path, PathBuf};

use solbuild_config::{load_config_from_str, load_config_or_default, ProjectConfig, CONFIG_FILE};
use solbuild_diagnostics::{DiagnosticRenderer, DiagnosticSink, Severity, TerminalRenderer};

use crate::GlobalArgs;

/// A located project: its root directory and parsed configuration.
#[derive(Debug)]
pub struct Project {
    /// Directory every configured path is anchored at.
    pub root: PathBuf,
    /// The parsed configuration (defaults when no file exists).
    pub config: ProjectConfig,
}

impl Project {
    /// Name shown in status lines: the configured name, else the root
    /// directory's name.
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.config.project.name {
            return name.clone();
        }
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string())
    }
}

/// Walks up from `start` looking for the nearest directory containing
/// `solbuild.toml`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).is_file() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Locates the project and loads its configuration.
///
/// With `--config`, a file path is loaded directly and its parent becomes
/// the root; a directory path is treated as the root. Otherwise the nearest
/// ancestor holding `solbuild.toml` is used, falling back to the current
/// directory with default configuration.
pub fn load_project(global: &GlobalArgs) -> Result<Project, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let path = PathBuf::from(config_path);
        if path.is_file() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            let config = load_config_from_str(&content)?;
            let root = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => std::env::current_dir()?,
            };
            return Ok(Project { root, config });
        }
        if !path.is_dir() {
            return Err(format!("config path {} does not exist", path.display()).into());
        }
        let config = load_config_or_default(&path)?;
        return Ok(Project { root: path, config });
    }

    let cwd = std::env::current_dir()?;
    let root = find_project_root(&cwd).unwrap_or(cwd);
    tracing::debug!(root = %root.display(), "project root");
    let config = load_config_or_default(&root)?;
    Ok(Project { root, config })
}

/// Renders every collected diagnostic to stderr. Warnings are skipped in
/// quiet mode.
pub fn render_diagnostics(sink: &DiagnosticSink, global: &GlobalArgs) {
    let renderer = TerminalRenderer::new(global.color);
    for diag in sink.diagnostics() {
        if global.quiet && diag.severity == Severity::Warning {
            continue;
        }
        eprintln!("{}", renderer.render(&diag));
    }
}
