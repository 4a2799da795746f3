//! Application context for unified dependency injection.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::{CatalogSource, HttpCatalogSource};
use crate::config::SklConfig;
use crate::git::{GitClient, SkillFetcher, SystemGit};
use crate::provider::ProviderRegistry;
use crate::state::StateStore;

/// Shared services and paths for one project.
///
/// The CLI creates this once and passes it to commands; tests swap in
/// their own providers, catalog source or git client.
#[derive(Clone)]
pub struct AppContext {
    project_root: PathBuf,
    global_config_dir: PathBuf,
    config: SklConfig,
    providers: Arc<ProviderRegistry>,
    catalog: Arc<dyn CatalogSource>,
    git: Arc<dyn GitClient>,
}

impl AppContext {
    /// Create a context for `project_root` using the user's config directory.
    pub fn new(project_root: PathBuf) -> anyhow::Result<Self> {
        let global_config_dir = dirs::config_dir()
            .map(|p| p.join("skl"))
            .or_else(|| dirs::home_dir().map(|home| home.join(".config").join("skl")))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Self::with_global_config_dir(project_root, global_config_dir)
    }

    /// Create context with custom global config directory (for testing).
    pub fn with_global_config_dir(
        project_root: PathBuf,
        global_config_dir: PathBuf,
    ) -> anyhow::Result<Self> {
        let config = SklConfig::load(&global_config_dir, &project_root)?;
        let catalog = HttpCatalogSource::new(config.catalog_timeout())?;
        Ok(Self {
            project_root,
            global_config_dir,
            config,
            providers: Arc::new(ProviderRegistry::with_default_providers()),
            catalog: Arc::new(catalog),
            git: Arc::new(SystemGit::new()),
        })
    }

    pub fn with_providers(mut self, providers: ProviderRegistry) -> Self {
        self.providers = Arc::new(providers);
        self
    }

    pub fn with_catalog_source(mut self, catalog: Arc<dyn CatalogSource>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_git(mut self, git: Arc<dyn GitClient>) -> Self {
        self.git = git;
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn global_config_dir(&self) -> &Path {
        &self.global_config_dir
    }

    pub fn config(&self) -> &SklConfig {
        &self.config
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn catalog_source(&self) -> &dyn CatalogSource {
        self.catalog.as_ref()
    }

    /// Manifest and lock for the project.
    pub fn state_store(&self) -> StateStore {
        StateStore::new(
            &self.project_root,
            &self.config.manifest_file,
            &self.config.lock_file,
        )
    }

    pub fn fetcher(&self) -> SkillFetcher {
        SkillFetcher::new(self.git.clone())
    }

    pub fn skills_root(&self) -> PathBuf {
        self.config.skills_root(&self.project_root)
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("project_root", &self.project_root)
            .field("global_config_dir", &self.global_config_dir)
            .field("config", &self.config)
            .field("providers", &self.providers.names())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn paths_follow_config() {
        let global = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        std::fs::write(
            project.path().join(crate::config::PROJECT_CONFIG_FILE),
            "skills_dir = \"tools/skills\"\nlock_file = \"skl.lock\"\n",
        )
        .unwrap();

        let ctx = AppContext::with_global_config_dir(
            project.path().to_path_buf(),
            global.path().to_path_buf(),
        )
        .unwrap();

        assert_eq!(ctx.skills_root(), project.path().join("tools/skills"));
        assert_eq!(ctx.state_store().lock().path(), project.path().join("skl.lock"));
        assert_eq!(
            ctx.state_store().manifest().path(),
            project.path().join("sklfile.json")
        );
        assert_eq!(ctx.providers().names(), vec!["github", "bitbucket"]);
    }
}
