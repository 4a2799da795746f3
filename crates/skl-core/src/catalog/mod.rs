//! Repository catalogs (`catalog.json`).
//!
//! A catalog is an optional index shipped at the root of a skills
//! repository. It lists package ids with descriptions and, optionally, the
//! path of each package inside the repository. Catalogs are fetched fresh
//! for every operation and never persisted.

mod http;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::provider::Provider;
use crate::reference::RepoRef;

pub use http::{CATALOG_FILE, DEFAULT_CATALOG_TIMEOUT, HttpCatalogSource};

/// Parsed `catalog.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub skills: Vec<CatalogEntry>,
}

/// One package listed in a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    #[serde(default, rename = "name")]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Location of the package inside the repository; overrides the
    /// conventional layouts when set.
    #[serde(default)]
    pub path: Option<String>,
}

impl Catalog {
    /// First entry whose id matches.
    pub fn find(&self, id: &str) -> Option<&CatalogEntry> {
        self.skills.iter().find(|entry| entry.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl CatalogEntry {
    /// Override path, if the entry carries a non-empty one.
    pub fn override_path(&self) -> Option<&str> {
        self.path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// Where catalogs come from.
pub trait CatalogSource: Send + Sync {
    /// Fetch the catalog of a repository.
    ///
    /// Errors mean "no catalog available"; callers must not treat them as
    /// fatal on their own.
    fn fetch(
        &self,
        provider: &dyn Provider,
        owner: &str,
        repo: &str,
        reference: Option<&str>,
    ) -> anyhow::Result<Catalog>;
}

/// Look up the catalog override path for a package.
///
/// Any catalog failure is swallowed and reported as `None`.
pub fn resolve_override_path(
    source: &dyn CatalogSource,
    provider: &dyn Provider,
    repo: &RepoRef,
    package_id: &str,
) -> Option<String> {
    match source.fetch(provider, &repo.owner, &repo.repo, repo.reference.as_deref()) {
        Ok(catalog) => {
            let path = catalog
                .find(package_id)
                .and_then(CatalogEntry::override_path)
                .map(str::to_string);
            if let Some(path) = &path {
                tracing::info!("Package {} located via catalog: {}", package_id, path);
            }
            path
        }
        Err(err) => {
            tracing::debug!("No catalog for {}: {:#}", repo.key(), err);
            None
        }
    }
}
