//! Compiler binary provisioning.
//!
//! [`BinaryProvider`] maps a version to a runnable [`SolcProcess`]: catalog
//! lookup, local binary cache, download on a miss, and one memoized instance
//! per version for the provider's lifetime.

use async_trait::async_trait;
use semver::Version;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use solbuild_cache::BinaryCache;
use solbuild_config::BuildOptions;

use crate::catalog::Catalog;
use crate::error::CompileError;
use crate::instance::{CompilerInstance, SolcProcess};

/// Supplies compiler instances by version.
#[async_trait]
pub trait CompilerProvider: Send + Sync {
    /// Versions this provider can supply, ascending.
    fn available_versions(&self) -> Vec<Version>;

    /// Returns a ready instance for `version`.
    async fn get_compiler(&self, version: &Version) -> Result<Arc<dyn CompilerInstance>, CompileError>;
}

/// Fetches raw compiler builds.
#[async_trait]
pub trait BinaryFetcher: Send + Sync {
    /// Downloads the bytes at `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, CompileError>;
}

/// Fetches builds over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Creates a fetcher applying `timeout` to each download.
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    /// Creates a fetcher over an existing client.
    pub fn with_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl BinaryFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, CompileError> {
        let failed = |reason: String| CompileError::DownloadFailed {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    failed(format!("timed out after {}s", self.timeout.as_secs()))
                } else {
                    failed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("HTTP {status}")));
        }

        let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Provides native compiler processes backed by a download cache.
pub struct BinaryProvider {
    catalog: Catalog,
    cache: BinaryCache,
    base_url: String,
    fetcher: Box<dyn BinaryFetcher>,
    instances: Mutex<HashMap<Version, Arc<dyn CompilerInstance>>>,
}

impl BinaryProvider {
    /// Creates a provider over `catalog`, caching builds in `cache` and
    /// fetching misses from `<base_url><build id>`.
    pub fn new(
        catalog: Catalog,
        cache: BinaryCache,
        base_url: impl Into<String>,
        fetcher: Box<dyn BinaryFetcher>,
    ) -> Self {
        Self {
            catalog,
            cache,
            base_url: base_url.into(),
            fetcher,
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a provider from resolved build options: the built-in catalog
    /// plus configured entries, the configured cache directory, and HTTP
    /// downloads with the configured timeout.
    pub fn from_options(options: &BuildOptions) -> Self {
        Self::new(
            Catalog::builtin().with_overrides(&options.catalog),
            BinaryCache::new(&options.cache_dir),
            options.binaries_url.clone(),
            Box::new(HttpFetcher::new(options.download_timeout)),
        )
    }

    /// The catalog this provider selects from.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    async fn ensure_binary(&self, version: &Version) -> Result<SolcProcess, CompileError> {
        let build = self
            .catalog
            .build_id(version)
            .ok_or_else(|| CompileError::UnknownCompilerVersion {
                version: version.clone(),
            })?;

        if let Some(path) = self.cache.lookup(build).await {
            return Ok(SolcProcess::new(&path, version.clone()));
        }

        let url = format!("{}{build}", self.base_url);
        tracing::info!(%version, %url, "downloading compiler");
        let data = self.fetcher.fetch(&url).await?;
        let path = self.cache.store(build, &data).await?;
        Ok(SolcProcess::new(&path, version.clone()))
    }
}

#[async_trait]
impl CompilerProvider for BinaryProvider {
    fn available_versions(&self) -> Vec<Version> {
        self.catalog.versions()
    }

    async fn get_compiler(&self, version: &Version) -> Result<Arc<dyn CompilerInstance>, CompileError> {
        // Held across the download so concurrent callers share one fetch.
        let mut instances = self.instances.lock().await;
        if let Some(instance) = instances.get(version) {
            return Ok(Arc::clone(instance));
        }
        let instance: Arc<dyn CompilerInstance> = Arc::new(self.ensure_binary(version).await?);
        instances.insert(version.clone(), Arc::clone(&instance));
        Ok(instance)
    }
}
