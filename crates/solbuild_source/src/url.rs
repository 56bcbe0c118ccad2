//! Resolution of `http(s)://` references.

use async_trait::async_trait;

use crate::resolver::Resolver;
use crate::unit::SourceUnit;

/// Fetches references that are absolute HTTP(S) URLs.
#[derive(Clone, Debug, Default)]
pub struct UrlResolver {
    client: reqwest::Client,
}

impl UrlResolver {
    /// Creates a resolver with a default HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver sharing an existing HTTP client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn is_url(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

#[async_trait]
impl Resolver for UrlResolver {
    fn name(&self) -> &'static str {
        "url"
    }

    async fn resolve(&self, reference: &str) -> Option<SourceUnit> {
        if !is_url(reference) {
            return None;
        }
        let response = match self.client.get(reference).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url = reference, error = %e, "source fetch failed");
                return None;
            }
        };
        if !response.status().is_success() {
            tracing::warn!(url = reference, status = %response.status(), "source fetch failed");
            return None;
        }
        let source = response.text().await.ok()?;
        Some(SourceUnit::new(reference, source))
    }
}
