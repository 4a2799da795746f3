//! Catalog lookup over HTTP.

use std::time::Duration;

use anyhow::Context;

use super::{Catalog, CatalogSource};
use crate::provider::Provider;

/// Well-known catalog file at the repository root.
pub const CATALOG_FILE: &str = "catalog.json";

/// Interactive-latency budget for catalog requests.
pub const DEFAULT_CATALOG_TIMEOUT: Duration = Duration::from_secs(2);

/// Fetches `catalog.json` through the provider's raw-file URL.
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    client: reqwest::blocking::Client,
}

impl HttpCatalogSource {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("skl/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    pub fn with_default_timeout() -> anyhow::Result<Self> {
        Self::new(DEFAULT_CATALOG_TIMEOUT)
    }
}

impl CatalogSource for HttpCatalogSource {
    fn fetch(
        &self,
        provider: &dyn Provider,
        owner: &str,
        repo: &str,
        reference: Option<&str>,
    ) -> anyhow::Result<Catalog> {
        let url = provider.raw_file_url(owner, repo, reference, CATALOG_FILE);
        tracing::debug!("Fetching catalog from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("Failed to fetch catalog from {}", url))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            anyhow::bail!("Catalog not found in repository (HTTP {}) at {}", status, url);
        }

        response
            .json::<Catalog>()
            .with_context(|| format!("Failed to parse catalog from {}", url))
    }
}
