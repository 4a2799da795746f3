//! Git hosting providers.
//!
//! A provider turns `owner/repo` coordinates into the URLs needed to clone,
//! browse and download raw files. Providers are pure: nothing here touches
//! the network.

mod bitbucket;
mod github;
mod registry;

pub use bitbucket::BitbucketProvider;
pub use github::GitHubProvider;
pub use registry::{ProviderError, ProviderRegistry};

/// URL builders for a git hosting service.
pub trait Provider: Send + Sync + std::fmt::Debug {
    /// Provider identifier used in references (e.g. "github").
    fn name(&self) -> &str;

    /// Branch used for raw-file URLs when no ref is given.
    fn default_branch(&self) -> &str {
        "main"
    }

    /// SSH clone URL for `owner/repo`.
    fn clone_url(&self, owner: &str, repo: &str) -> String;

    /// Browsable HTTPS URL for `owner/repo`.
    fn browse_url(&self, owner: &str, repo: &str) -> String;

    /// URL that downloads `path` at `reference` as a raw file.
    ///
    /// An empty or missing ref falls back to [`Provider::default_branch`].
    fn raw_file_url(&self, owner: &str, repo: &str, reference: Option<&str>, path: &str)
    -> String;
}

/// Pick the ref to use for a raw-file URL.
pub(crate) fn effective_ref<'a>(provider: &'a dyn Provider, reference: Option<&'a str>) -> &'a str {
    match reference {
        Some(r) if !r.is_empty() && r != crate::reference::ANY_REF => r,
        _ => provider.default_branch(),
    }
}
