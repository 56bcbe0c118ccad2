//! Local cache of downloaded compiler binaries.
//!
//! Each build is stored as `<cache_dir>/<build_id>` next to a sidecar
//! `<build_id>.json` recording the format version and a checksum of the
//! binary. Lookups are fail-safe: a missing sidecar, a format mismatch or a
//! checksum mismatch is a cache miss, and the caller fetches the build again.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use solbuild_common::ContentHash;

use crate::error::CacheError;

/// Current sidecar format version. Increment on breaking changes.
const SIDECAR_FORMAT_VERSION: u32 = 1;

/// Metadata stored beside every cached binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryMeta {
    /// Sidecar format version.
    pub format_version: u32,
    /// Build identifier the binary was fetched as.
    pub build: String,
    /// Hex XXH3-128 checksum of the binary.
    pub checksum: String,
    /// Binary size in bytes.
    pub size: u64,
}

/// On-disk cache of compiler builds keyed by build identifier.
#[derive(Debug, Clone)]
pub struct BinaryCache {
    dir: PathBuf,
}

impl BinaryCache {
    /// Creates a cache rooted at `dir`. The directory is created on the
    /// first store.
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// Path the binary for `build` is stored at.
    pub fn binary_path(&self, build: &str) -> PathBuf {
        self.dir.join(build)
    }

    fn meta_path(&self, build: &str) -> PathBuf {
        self.dir.join(format!("{build}.json"))
    }

    /// Returns the path of a valid cached binary for `build`, or `None` on
    /// any kind of miss.
    pub async fn lookup(&self, build: &str) -> Option<PathBuf> {
        let meta_raw = tokio::fs::read_to_string(self.meta_path(build)).await.ok()?;
        let meta: BinaryMeta = match serde_json::from_str(&meta_raw) {
            Ok(meta) => meta,
            Err(e) => {
                tracing::warn!(build, error = %e, "unreadable binary cache metadata");
                return None;
            }
        };
        if meta.format_version != SIDECAR_FORMAT_VERSION || meta.build != build {
            return None;
        }

        let path = self.binary_path(build);
        let data = tokio::fs::read(&path).await.ok()?;
        if data.len() as u64 != meta.size
            || ContentHash::from_bytes(&data).to_string() != meta.checksum
        {
            tracing::warn!(build, "cached compiler binary failed checksum validation");
            return None;
        }

        tracing::debug!(build, path = %path.display(), "compiler binary cache hit");
        Some(path)
    }

    /// Stores `data` as the binary for `build` and returns its path.
    ///
    /// The binary is written before its sidecar, so an interrupted store is
    /// seen as a miss rather than as a valid entry.
    pub async fn store(&self, build: &str, data: &[u8]) -> Result<PathBuf, CacheError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| CacheError::Io {
                path: self.dir.clone(),
                source: e,
            })?;

        let path = self.binary_path(build);
        let tmp = self.dir.join(format!(".{build}.tmp"));
        write_file(&tmp, data).await?;
        mark_executable(&tmp).await?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| CacheError::Io {
                path: path.clone(),
                source: e,
            })?;

        let meta = BinaryMeta {
            format_version: SIDECAR_FORMAT_VERSION,
            build: build.to_string(),
            checksum: ContentHash::from_bytes(data).to_string(),
            size: data.len() as u64,
        };
        let meta_json = serde_json::to_string_pretty(&meta).map_err(|e| {
            CacheError::Serialization {
                reason: e.to_string(),
            }
        })?;
        write_file(&self.meta_path(build), meta_json.as_bytes()).await?;

        tracing::debug!(build, size = data.len(), "stored compiler binary");
        Ok(path)
    }
}

async fn write_file(path: &Path, data: &[u8]) -> Result<(), CacheError> {
    tokio::fs::write(path, data)
        .await
        .map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        })
}

#[cfg(unix)]
async fn mark_executable(path: &Path) -> Result<(), CacheError> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .await
        .map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        })
}

#[cfg(not(unix))]
async fn mark_executable(_path: &Path) -> Result<(), CacheError> {
    Ok(())
}
