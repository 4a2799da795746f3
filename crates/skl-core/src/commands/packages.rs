//! Materializing and removing single packages.
//!
//! Shared by the install command and by `update`, which drives it through
//! [`PackageActions`].

use std::path::PathBuf;

use crate::catalog::resolve_override_path;
use crate::context::AppContext;
use crate::git::{FetchError, FetchRequest, SkillFetcher};
use crate::reconcile::PackageActions;
use crate::reference::{ANY_REF, PackageRef, RepoRef, package_name_from_key};
use crate::skills::{package_dir, remove_package_dir, validate_package_name};
use crate::state::ensure_gitignore_entry;

/// A package present in the skills root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Materialized {
    pub path: PathBuf,
    /// Repository path the package came from; `None` for local packages.
    pub subtree: Option<String>,
    /// Value to record in the lock.
    pub locked: String,
}

pub(crate) struct PackageManager<'a> {
    ctx: &'a AppContext,
    fetcher: SkillFetcher,
    skills_root: PathBuf,
}

impl<'a> PackageManager<'a> {
    pub(crate) fn new(ctx: &'a AppContext) -> Self {
        Self {
            ctx,
            fetcher: ctx.fetcher(),
            skills_root: ctx.skills_root(),
        }
    }

    pub(crate) fn materialize(
        &self,
        package: &PackageRef,
        force: bool,
    ) -> anyhow::Result<Materialized> {
        validate_package_name(package.package_id())?;
        match package {
            PackageRef::Local { package_id } => self.verify_local(package_id),
            PackageRef::Remote { repo, package_id } => self.fetch_remote(repo, package_id, force),
        }
    }

    /// Local packages live in the project already; only check presence.
    fn verify_local(&self, package_id: &str) -> anyhow::Result<Materialized> {
        let path = package_dir(&self.skills_root, package_id);
        if !path.is_dir() {
            anyhow::bail!(
                "Local package {:?} not found at {}",
                package_id,
                path.display()
            );
        }
        Ok(Materialized {
            path,
            subtree: None,
            locked: ANY_REF.to_string(),
        })
    }

    fn fetch_remote(
        &self,
        repo: &RepoRef,
        package_id: &str,
        force: bool,
    ) -> anyhow::Result<Materialized> {
        let dest = package_dir(&self.skills_root, package_id);
        if !force && dest.exists() {
            return Err(FetchError::AlreadyExists {
                package: package_id.to_string(),
                path: dest,
            }
            .into());
        }

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
        let installed = self.fetcher.install(&request, &dest, force)?;
        let locked = self.lock_value(&clone_url, repo.reference.as_deref());

        Ok(Materialized {
            path: installed.path,
            subtree: Some(installed.subtree),
            locked,
        })
    }

    /// Commit hash for the lock, or the symbolic ref when it cannot be
    /// resolved.
    fn lock_value(&self, clone_url: &str, reference: Option<&str>) -> String {
        match self.fetcher.resolve_ref(clone_url, reference) {
            Ok(sha) => sha,
            Err(err) => {
                let fallback = reference.unwrap_or(ANY_REF).to_string();
                tracing::warn!("{}; locking {:?} instead of a commit", err, fallback);
                fallback
            }
        }
    }
}

/// Keep the lock file out of version control when configured to.
///
/// Returns whether `.gitignore` changed. Errors are logged only.
pub(crate) fn ignore_lock_file(ctx: &AppContext) -> bool {
    if !ctx.config().manage_gitignore {
        return false;
    }
    match ensure_gitignore_entry(ctx.project_root(), &ctx.config().lock_file) {
        Ok(changed) => changed,
        Err(err) => {
            tracing::warn!("Could not update .gitignore: {:#}", err);
            false
        }
    }
}

impl PackageActions for PackageManager<'_> {
    fn remove(&self, key: &str) -> anyhow::Result<()> {
        let name = match PackageRef::parse(key) {
            Ok(package) if package.is_local() => {
                tracing::info!("Leaving local package {} in place", package.package_id());
                return Ok(());
            }
            Ok(package) => package.package_id().to_string(),
            Err(_) => package_name_from_key(key).to_string(),
        };
        remove_package_dir(&self.skills_root, &name)?;
        Ok(())
    }

    fn install(&self, key: &str, reference: &str) -> anyhow::Result<String> {
        let package = PackageRef::from_entry(key, reference)?;
        // The manifest owns this path; replace whatever is there.
        Ok(self.materialize(&package, true)?.locked)
    }
}
