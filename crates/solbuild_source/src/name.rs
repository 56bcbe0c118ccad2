//! Resolution of bare unit names by searching the source directory.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::fs::read_source;
use crate::resolver::Resolver;
use crate::unit::SourceUnit;

/// File extension of compilable source units.
const SOURCE_EXT: &str = "sol";

/// Resolves bare unit names (`Token`) to `<root>/**/Token.sol` and
/// enumerates every source unit under the root.
///
/// Resolved units carry their path relative to the root, with `/`
/// separators, so they line up with imports normalized against them.
#[derive(Clone, Debug)]
pub struct NameResolver {
    root: PathBuf,
}

impl NameResolver {
    /// Creates a resolver searching under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn relative_path(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

/// Recursively collects source files under `root`, sorted by path.
pub(crate) async fn discover_sources(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                continue;
            }
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            match entry.file_type().await {
                Ok(ft) if ft.is_dir() => pending.push(path),
                Ok(_) if path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXT) => {
                    files.push(path)
                }
                _ => {}
            }
        }
    }

    files.sort();
    files
}

#[async_trait]
impl Resolver for NameResolver {
    fn name(&self) -> &'static str {
        "name"
    }

    async fn resolve(&self, reference: &str) -> Option<SourceUnit> {
        if reference.contains('/') || reference.ends_with(".sol") {
            return None;
        }
        let file_name = format!("{reference}.{SOURCE_EXT}");
        for path in discover_sources(&self.root).await {
            if path.file_name().and_then(|n| n.to_str()) == Some(file_name.as_str()) {
                let rel = self.relative_path(&path)?;
                let source = read_source(&path).await?;
                return Some(SourceUnit::new(rel, source));
            }
        }
        None
    }

    async fn list_all(&self) -> Vec<SourceUnit> {
        let mut units = Vec::new();
        for path in discover_sources(&self.root).await {
            let (Some(rel), Some(source)) = (self.relative_path(&path), read_source(&path).await)
            else {
                continue;
            };
            units.push(SourceUnit::new(rel, source));
        }
        units
    }
}
