//! Resolution of package imports from `node_modules`.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::fs::read_source;
use crate::resolver::Resolver;
use crate::unit::SourceUnit;

/// Resolves package references such as
/// `@openzeppelin/contracts/token/ERC20/ERC20.sol` by looking in
/// `node_modules` directories, walking up from the project root.
#[derive(Clone, Debug)]
pub struct NpmResolver {
    project_root: PathBuf,
}

impl NpmResolver {
    /// Creates a resolver searching upward from `project_root`.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }
}

#[async_trait]
impl Resolver for NpmResolver {
    fn name(&self) -> &'static str {
        "npm"
    }

    async fn resolve(&self, reference: &str) -> Option<SourceUnit> {
        if reference.starts_with('.') || reference.starts_with('/') || !reference.contains('/') {
            return None;
        }
        let mut dir = Some(self.project_root.as_path());
        while let Some(current) = dir {
            let candidate = current.join("node_modules").join(reference);
            if let Some(source) = read_source(&candidate).await {
                return Some(SourceUnit::new(reference, source));
            }
            dir = current.parent();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finds_package_in_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("node_modules/@oz/contracts/access");
        std::fs::create_dir_all(&pkg).unwrap();
        std::fs::write(pkg.join("Ownable.sol"), "contract Ownable {}").unwrap();
        let project = dir.path().join("packages/app");
        std::fs::create_dir_all(&project).unwrap();

        let resolver = NpmResolver::new(&project);
        let unit = resolver
            .resolve("@oz/contracts/access/Ownable.sol")
            .await
            .unwrap();
        assert_eq!(unit.path, "@oz/contracts/access/Ownable.sol");
        assert_eq!(unit.source, "contract Ownable {}");
    }

    #[tokio::test]
    async fn ignores_relative_and_bare_references() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = NpmResolver::new(dir.path());
        assert!(resolver.resolve("./A.sol").await.is_none());
        assert!(resolver.resolve("Token").await.is_none());
    }
}
