#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use skl_core::catalog::{Catalog, CatalogSource};
use skl_core::context::AppContext;
use skl_core::provider::{Provider, ProviderRegistry};

const GIT_ENV_OVERRIDES: [&str; 4] = [
    "GIT_DIR",
    "GIT_WORK_TREE",
    "GIT_INDEX_FILE",
    "GIT_COMMON_DIR",
];

/// Provider name used by fixture references (`fixture@owner/repo/pkg`).
pub const FIXTURE_PROVIDER: &str = "fixture";

pub fn git_command() -> Command {
    let mut cmd = Command::new("git");
    for key in GIT_ENV_OVERRIDES {
        cmd.env_remove(key);
    }
    cmd
}

pub fn run_git(repo: &Path, args: &[&str]) -> String {
    let output = git_command()
        .args(args)
        .current_dir(repo)
        .output()
        .expect("Failed to invoke git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

pub fn skill_md(name: &str) -> String {
    format!("---\nname: {name}\ndescription: Test skill for {name}.\n---\n# {name}\n")
}

/// A working repository under `<root>/<owner>/<repo>`.
pub struct TestRepo {
    pub path: PathBuf,
}

impl TestRepo {
    pub fn init(root: &Path, owner: &str, repo: &str) -> Self {
        let path = root.join(owner).join(repo);
        std::fs::create_dir_all(&path).expect("Failed to create repo dir");
        run_git(&path, &["init"]);
        run_git(&path, &["checkout", "-b", "main"]);
        run_git(&path, &["config", "user.email", "test@example.com"]);
        run_git(&path, &["config", "user.name", "Test User"]);
        run_git(&path, &["config", "commit.gpgsign", "false"]);
        run_git(&path, &["config", "tag.gpgsign", "false"]);
        Self { path }
    }

    pub fn write(&self, relative: &str, content: &str) -> &Self {
        let file = self.path.join(relative);
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(file, content).unwrap();
        self
    }

    pub fn remove(&self, relative: &str) -> &Self {
        run_git(&self.path, &["rm", "-r", "-q", relative]);
        self
    }

    pub fn commit(&self, message: &str) -> String {
        run_git(&self.path, &["add", "-A"]);
        run_git(&self.path, &["commit", "-q", "-m", message]);
        self.head()
    }

    pub fn tag(&self, name: &str) {
        run_git(&self.path, &["tag", "-a", name, "-m", name]);
    }

    pub fn head(&self) -> String {
        run_git(&self.path, &["rev-parse", "HEAD"])
    }

    pub fn file_url(&self) -> String {
        url::Url::from_directory_path(&self.path)
            .expect("repo root should convert to file URL")
            .to_string()
    }
}

/// Serves repositories from a local directory through `file://` URLs.
#[derive(Debug)]
pub struct FixtureProvider {
    root: PathBuf,
}

impl FixtureProvider {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn repo_url(&self, owner: &str, repo: &str) -> String {
        url::Url::from_directory_path(self.root.join(owner).join(repo))
            .expect("fixture path should convert to file URL")
            .to_string()
    }
}

impl Provider for FixtureProvider {
    fn name(&self) -> &str {
        FIXTURE_PROVIDER
    }

    fn clone_url(&self, owner: &str, repo: &str) -> String {
        self.repo_url(owner, repo)
    }

    fn browse_url(&self, owner: &str, repo: &str) -> String {
        self.repo_url(owner, repo)
    }

    fn raw_file_url(&self, owner: &str, repo: &str, _reference: Option<&str>, path: &str) -> String {
        format!("{}{}", self.repo_url(owner, repo), path)
    }
}

/// Catalog source for repositories without a catalog.
pub struct NoCatalog;

impl CatalogSource for NoCatalog {
    fn fetch(
        &self,
        _provider: &dyn Provider,
        _owner: &str,
        repo: &str,
        _reference: Option<&str>,
    ) -> anyhow::Result<Catalog> {
        anyhow::bail!("Catalog not found in repository {}", repo)
    }
}

/// Catalog source that returns the same catalog for every repository.
pub struct FixedCatalog(pub Catalog);

impl CatalogSource for FixedCatalog {
    fn fetch(
        &self,
        _provider: &dyn Provider,
        _owner: &str,
        _repo: &str,
        _reference: Option<&str>,
    ) -> anyhow::Result<Catalog> {
        Ok(self.0.clone())
    }
}

/// Scratch layout: fixture repositories, a project and a global config dir.
pub struct Workspace {
    pub temp: tempfile::TempDir,
    pub repos: PathBuf,
    pub project: PathBuf,
    pub config: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let temp = tempfile::TempDir::new().expect("Failed to create temp dir");
        let repos = temp.path().join("repos");
        let project = temp.path().join("project");
        let config = temp.path().join("config");
        for dir in [&repos, &project, &config] {
            std::fs::create_dir_all(dir).unwrap();
        }
        Self {
            temp,
            repos,
            project,
            config,
        }
    }

    pub fn repo(&self, owner: &str, repo: &str) -> TestRepo {
        TestRepo::init(&self.repos, owner, repo)
    }

    pub fn context(&self) -> AppContext {
        self.context_with_catalog(Arc::new(NoCatalog))
    }

    pub fn context_with_catalog(&self, catalog: Arc<dyn CatalogSource>) -> AppContext {
        let mut providers = ProviderRegistry::with_default_providers();
        providers.register(Box::new(FixtureProvider::new(&self.repos)));
        AppContext::with_global_config_dir(self.project.clone(), self.config.clone())
            .expect("context should build")
            .with_providers(providers)
            .with_catalog_source(catalog)
    }

    pub fn skill_dir(&self, name: &str) -> PathBuf {
        self.project.join(".agent/skills").join(name)
    }

    pub fn write_manifest(&self, entries: &[(&str, &str)]) {
        let skills: serde_json::Map<String, serde_json::Value> = entries
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        let doc = serde_json::json!({ "skills": skills });
        std::fs::write(
            self.project.join("sklfile.json"),
            serde_json::to_string_pretty(&doc).unwrap(),
        )
        .unwrap();
    }
}
