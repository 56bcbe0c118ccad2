//! On-disk artifact storage: one JSON file per unit.
//!
//! Artifacts live at `<artifacts_dir>/<unit_name>.json`. Reads distinguish a
//! missing artifact (normal, first build) from an unreadable one (an error,
//! since the file may hold deployment records nobody should lose). Writes go
//! through a temporary file and a rename so a crash never leaves a torn
//! artifact behind.

use std::path::{Path, PathBuf};

use crate::artifact::Artifact;
use crate::error::CacheError;

/// File extension for persisted artifacts.
const ARTIFACT_EXT: &str = "json";

/// Reads and writes persisted artifacts in one directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Creates a store rooted at `dir`. The directory is created lazily on
    /// the first write.
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// The directory artifacts are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file path of the artifact for `unit_name`.
    pub fn artifact_path(&self, unit_name: &str) -> PathBuf {
        self.dir.join(format!("{unit_name}.{ARTIFACT_EXT}"))
    }

    /// Loads the artifact for `unit_name`.
    ///
    /// Returns `Ok(None)` when no artifact exists yet.
    pub async fn load(&self, unit_name: &str) -> Result<Option<Artifact>, CacheError> {
        let path = self.artifact_path(unit_name);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::Io { path, source: e }),
        };
        let artifact = serde_json::from_str(&content).map_err(|e| CacheError::ArtifactParse {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        tracing::trace!(path = %path.display(), "loaded artifact");
        Ok(Some(artifact))
    }

    /// Persists `artifact` as the artifact for `unit_name`, replacing any
    /// previous file atomically.
    pub async fn save(&self, unit_name: &str, artifact: &Artifact) -> Result<PathBuf, CacheError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| CacheError::Io {
                path: self.dir.clone(),
                source: e,
            })?;

        let json = to_json(artifact)?;
        let path = self.artifact_path(unit_name);
        let tmp = self.dir.join(format!(".{unit_name}.{ARTIFACT_EXT}.tmp"));

        tokio::fs::write(&tmp, json.as_bytes())
            .await
            .map_err(|e| CacheError::Io {
                path: tmp.clone(),
                source: e,
            })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| CacheError::Io {
                path: path.clone(),
                source: e,
            })?;

        tracing::debug!(path = %path.display(), "wrote artifact");
        Ok(path)
    }
}

/// Serializes an artifact the way the store writes it: sorted keys, pretty
/// printed, trailing newline.
pub fn to_json(artifact: &Artifact) -> Result<String, CacheError> {
    artifact
        .to_canonical_json()
        .map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })
}
