//! Catalog listing for a repository.

use crate::catalog::Catalog;
use crate::context::AppContext;
use crate::reference::RepoRef;

/// Report from a catalog listing
#[derive(Debug, Clone)]
pub struct CatalogReport {
    /// `provider@owner/repo[:ref]`
    pub repo: String,
    pub browse_url: String,
    /// `None` when the repository ships no readable catalog
    pub catalog: Option<Catalog>,
}

/// Catalog command orchestrator
#[derive(Debug)]
pub struct CatalogCommand<'a> {
    ctx: &'a AppContext,
}

impl<'a> CatalogCommand<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    /// List the catalog of `provider@owner/repo[:ref]`.
    ///
    /// A missing or unreadable catalog is not an error.
    pub fn execute(&self, reference: &str) -> anyhow::Result<CatalogReport> {
        let repo = RepoRef::parse(reference)?;
        let provider = self.ctx.providers().get(&repo.provider)?;
        let browse_url = provider.browse_url(&repo.owner, &repo.repo);

        let catalog = match self.ctx.catalog_source().fetch(
            provider,
            &repo.owner,
            &repo.repo,
            repo.reference.as_deref(),
        ) {
            Ok(catalog) => Some(catalog),
            Err(err) => {
                tracing::debug!("No catalog for {}: {:#}", repo, err);
                None
            }
        };

        Ok(CatalogReport {
            repo: repo.to_string(),
            browse_url,
            catalog,
        })
    }
}
