//! Show a package's `SKILL.md`, installed or remote.

use std::path::PathBuf;

use anyhow::Context;

use crate::catalog::resolve_override_path;
use crate::context::AppContext;
use crate::git::{FetchRequest, SKILL_MARKER};
use crate::reference::{PackageRef, RepoRef};
use crate::skills::{package_dir, validate_package_name};

/// Where the document was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoSource {
    Installed { path: PathBuf },
    Remote { key: String, browse_url: String },
}

/// Report from an info lookup
#[derive(Debug, Clone)]
pub struct InfoReport {
    pub package_id: String,
    pub source: InfoSource,
    pub content: String,
}

/// Info command orchestrator
#[derive(Debug)]
pub struct InfoCommand<'a> {
    ctx: &'a AppContext,
}

impl<'a> InfoCommand<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    /// `target` is an installed package name or a package reference.
    ///
    /// Remote references are fetched without installing anything.
    pub fn execute(&self, target: &str) -> anyhow::Result<InfoReport> {
        match PackageRef::parse(target) {
            Ok(PackageRef::Remote { repo, package_id }) => self.remote(&repo, &package_id),
            Ok(PackageRef::Local { package_id }) => self.installed(&package_id),
            Err(err) if target.contains('@') => Err(err.into()),
            Err(_) => self.installed(target),
        }
    }

    fn installed(&self, name: &str) -> anyhow::Result<InfoReport> {
        validate_package_name(name)?;
        let path = package_dir(&self.ctx.skills_root(), name).join(SKILL_MARKER);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                anyhow::bail!(
                    "Package {:?} is not installed (no {} at {})",
                    name,
                    SKILL_MARKER,
                    path.display()
                );
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };
        Ok(InfoReport {
            package_id: name.to_string(),
            source: InfoSource::Installed { path },
            content,
        })
    }

    fn remote(&self, repo: &RepoRef, package_id: &str) -> anyhow::Result<InfoReport> {
        let provider = self.ctx.providers().get(&repo.provider)?;
        let clone_url = provider.clone_url(&repo.owner, &repo.repo);
        let browse_url = provider.browse_url(&repo.owner, &repo.repo);
        let override_path =
            resolve_override_path(self.ctx.catalog_source(), provider, repo, package_id);

        let request = FetchRequest {
            clone_url: &clone_url,
            browse_url: &browse_url,
            package_id,
            reference: repo.reference.as_deref(),
            override_path: override_path.as_deref(),
        };
        let bytes = self.ctx.fetcher().fetch_file(&request, SKILL_MARKER)?;

        Ok(InfoReport {
            package_id: package_id.to_string(),
            source: InfoSource::Remote {
                key: format!("{}/{}", repo.key(), package_id),
                browse_url,
            },
            content: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}
