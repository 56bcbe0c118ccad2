//! Filesystem-backed resolvers.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::resolver::Resolver;
use crate::unit::SourceUnit;

/// Reads `path`, treating a missing file as "not mine".
///
/// Other I/O failures are logged and also reported as a miss so the next
/// strategy in the chain gets a chance.
pub(crate) async fn read_source(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(source) => Some(source),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read source");
            None
        }
    }
}

/// Resolves references that are valid filesystem paths as given
/// (absolute, or relative to the working directory).
#[derive(Clone, Debug, Default)]
pub struct FsResolver;

#[async_trait]
impl Resolver for FsResolver {
    fn name(&self) -> &'static str {
        "fs"
    }

    async fn resolve(&self, reference: &str) -> Option<SourceUnit> {
        let source = read_source(Path::new(reference)).await?;
        Some(SourceUnit::new(reference, source))
    }
}

/// Resolves references relative to a fixed root directory, normally the
/// project's source directory.
#[derive(Clone, Debug)]
pub struct RelativeFsResolver {
    root: PathBuf,
}

impl RelativeFsResolver {
    /// Creates a resolver rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Resolver for RelativeFsResolver {
    fn name(&self) -> &'static str {
        "relative-fs"
    }

    async fn resolve(&self, reference: &str) -> Option<SourceUnit> {
        if Path::new(reference).is_absolute() {
            return None;
        }
        let source = read_source(&self.root.join(reference)).await?;
        Some(SourceUnit::new(reference, source))
    }
}
