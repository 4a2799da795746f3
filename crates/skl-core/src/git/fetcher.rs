//! Sparse clone, subtree resolution and materialization of one package.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use super::client::GitClient;
use super::error::{FetchError, classify_clone_error};
use crate::reference::ANY_REF;

/// Conventional package root, tried first.
pub const PRIMARY_ROOT: &str = ".agent/skills";
/// Legacy package root, tried when the primary path is absent.
pub const FALLBACK_ROOT: &str = "skills";
/// Marker file every package carries.
pub const SKILL_MARKER: &str = "SKILL.md";

/// Where to fetch a package from.
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
    pub clone_url: &'a str,
    pub browse_url: &'a str,
    pub package_id: &'a str,
    /// Branch or tag; `None` (or `*`) means the remote default.
    pub reference: Option<&'a str>,
    /// Catalog-provided location of the package inside the repository.
    pub override_path: Option<&'a str>,
}

impl FetchRequest<'_> {
    fn pinned_ref(&self) -> Option<&str> {
        self.reference
            .filter(|reference| !reference.is_empty() && *reference != ANY_REF)
    }
}

/// A package copied into place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub path: PathBuf,
    /// Repository path the package was taken from (empty for the root).
    pub subtree: String,
}

/// A temporary clone with one subtree checked out.
///
/// Dropping it removes the clone.
struct Checkout {
    dir: TempDir,
    subtree: String,
}

impl Checkout {
    fn root(&self) -> PathBuf {
        if self.subtree.is_empty() {
            self.dir.path().to_path_buf()
        } else {
            self.dir.path().join(&self.subtree)
        }
    }
}

/// Fetches package subtrees through a [`GitClient`].
#[derive(Debug, Clone)]
pub struct SkillFetcher {
    git: Arc<dyn GitClient>,
}

impl SkillFetcher {
    pub fn new(git: Arc<dyn GitClient>) -> Self {
        Self { git }
    }

    /// Install the package into `dest`.
    ///
    /// An existing `dest` is an error unless `force` is set, in which case
    /// it is removed before cloning.
    pub fn install(
        &self,
        request: &FetchRequest<'_>,
        dest: &Path,
        force: bool,
    ) -> Result<InstalledPackage, FetchError> {
        if dest.symlink_metadata().is_ok() {
            if !force {
                return Err(FetchError::AlreadyExists {
                    package: request.package_id.to_string(),
                    path: dest.to_path_buf(),
                });
            }
            tracing::info!("Replacing existing package at {}", dest.display());
            remove_path(dest)?;
        }

        let checkout = self.checkout_subtree(request)?;

        std::fs::create_dir_all(dest).map_err(|e| {
            FetchError::io(format!("Failed to create directory {}", dest.display()), e)
        })?;
        if let Err(err) = copy_tree_filtered(&checkout.root(), dest) {
            // Do not leave a half-copied package behind.
            let _ = std::fs::remove_dir_all(dest);
            return Err(err);
        }

        tracing::debug!(
            "Installed {} from {:?} into {}",
            request.package_id,
            checkout.subtree,
            dest.display()
        );
        Ok(InstalledPackage {
            path: dest.to_path_buf(),
            subtree: checkout.subtree,
        })
    }

    /// Read one file from the package without installing it.
    pub fn fetch_file(
        &self,
        request: &FetchRequest<'_>,
        file_name: &str,
    ) -> Result<Vec<u8>, FetchError> {
        let checkout = self.checkout_subtree(request)?;
        let path = checkout.root().join(file_name);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FetchError::FileNotFound {
                file: file_name.to_string(),
                package: request.package_id.to_string(),
            }),
            Err(e) => Err(FetchError::io(
                format!("Failed to read {}", path.display()),
                e,
            )),
        }
    }

    /// Resolve `reference` (or the remote HEAD) to a commit hash.
    ///
    /// For annotated tags the peeled commit wins over the tag object.
    pub fn resolve_ref(
        &self,
        clone_url: &str,
        reference: Option<&str>,
    ) -> Result<String, FetchError> {
        let target = reference
            .filter(|r| !r.is_empty() && *r != ANY_REF)
            .unwrap_or("HEAD");

        let refs = self
            .git
            .ls_remote(clone_url, target)
            .map_err(|e| FetchError::RefResolution {
                reference: target.to_string(),
                detail: e.diagnostics(),
            })?;

        refs.iter()
            .find(|r| r.name.ends_with("^{}"))
            .or_else(|| refs.first())
            .map(|r| r.sha.clone())
            .ok_or_else(|| FetchError::RefResolution {
                reference: target.to_string(),
                detail: format!("no remote ref matches {:?}", target),
            })
    }

    fn checkout_subtree(&self, request: &FetchRequest<'_>) -> Result<Checkout, FetchError> {
        let dir = tempfile::Builder::new()
            .prefix("skl-clone-")
            .tempdir()
            .map_err(|e| FetchError::io("Failed to create temporary directory", e))?;
        let reference = request.pinned_ref();

        tracing::debug!(
            "Cloning {} (ref {}) into {}",
            request.clone_url,
            reference.unwrap_or("default"),
            dir.path().display()
        );
        self.git
            .clone_narrow(request.clone_url, dir.path(), reference)
            .map_err(|e| classify_clone_error(&e.diagnostics(), request.browse_url, reference))?;

        let subtree = self.resolve_subtree(dir.path(), request)?;

        self.git
            .select_subtree(dir.path(), &subtree)
            .map_err(|e| FetchError::Git {
                operation: "sparse-checkout",
                detail: e.diagnostics(),
            })?;
        self.git
            .checkout(dir.path())
            .map_err(|e| FetchError::Git {
                operation: "checkout",
                detail: e.diagnostics(),
            })?;

        let checkout = Checkout { dir, subtree };
        if !checkout.root().is_dir() {
            return Err(FetchError::PackageNotFound {
                package: request.package_id.to_string(),
                expected: checkout.subtree.clone(),
                tried: vec![checkout.subtree.clone()],
                browse_url: request.browse_url.to_string(),
            });
        }
        Ok(checkout)
    }

    /// Pick the repository path holding the package.
    ///
    /// A catalog override is taken as-is; otherwise the conventional roots
    /// are checked in order against the cloned tree.
    fn resolve_subtree(
        &self,
        repo_dir: &Path,
        request: &FetchRequest<'_>,
    ) -> Result<String, FetchError> {
        if let Some(path) = request.override_path {
            let subtree = override_subtree(path);
            tracing::debug!("Using catalog path {:?} for {}", subtree, request.package_id);
            return Ok(subtree);
        }

        let candidates = conventional_paths(request.package_id);
        for candidate in &candidates {
            let found = self
                .git
                .tree_contains(repo_dir, candidate)
                .map_err(|e| FetchError::Git {
                    operation: "ls-tree",
                    detail: e.diagnostics(),
                })?;
            if found {
                return Ok(candidate.clone());
            }
            tracing::debug!("{} not present in repository", candidate);
        }

        Err(FetchError::PackageNotFound {
            package: request.package_id.to_string(),
            expected: candidates[0].clone(),
            tried: candidates.to_vec(),
            browse_url: request.browse_url.to_string(),
        })
    }
}

/// Conventional locations for `package_id`, in lookup order.
pub fn conventional_paths(package_id: &str) -> [String; 2] {
    [
        format!("{}/{}", PRIMARY_ROOT, package_id),
        format!("{}/{}", FALLBACK_ROOT, package_id),
    ]
}

/// Normalize a catalog path to the directory to check out.
///
/// A path naming the marker file is replaced by its directory, so
/// `tools/fmt/SKILL.md` becomes `tools/fmt` and a bare `SKILL.md` the
/// repository root.
pub fn override_subtree(path: &str) -> String {
    let path = path.trim().trim_start_matches("./").trim_matches('/');
    if path == SKILL_MARKER {
        return String::new();
    }
    path.strip_suffix(SKILL_MARKER)
        .and_then(|dir| dir.strip_suffix('/'))
        .unwrap_or(path)
        .to_string()
}

fn remove_path(path: &Path) -> Result<(), FetchError> {
    let result = match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(path),
        _ => std::fs::remove_file(path),
    };
    result.map_err(|e| FetchError::io(format!("Failed to remove {}", path.display()), e))
}

fn copy_tree_filtered(src: &Path, dst: &Path) -> Result<(), FetchError> {
    let entries = std::fs::read_dir(src)
        .map_err(|e| FetchError::io(format!("Failed to read directory {}", src.display()), e))?;
    for entry in entries {
        let entry =
            entry.map_err(|e| FetchError::io(format!("Failed to read {}", src.display()), e))?;
        let file_name = entry.file_name();
        if file_name == ".git" {
            continue;
        }
        let src_path = entry.path();
        let dst_path = dst.join(&file_name);
        let file_type = entry
            .file_type()
            .map_err(|e| FetchError::io(format!("Failed to stat {}", src_path.display()), e))?;
        if file_type.is_dir() {
            std::fs::create_dir_all(&dst_path).map_err(|e| {
                FetchError::io(format!("Failed to create {}", dst_path.display()), e)
            })?;
            copy_tree_filtered(&src_path, &dst_path)?;
        } else if file_type.is_file() {
            std::fs::copy(&src_path, &dst_path).map_err(|e| {
                FetchError::io(format!("Failed to copy {}", src_path.display()), e)
            })?;
        } else {
            // Links are never followed out of the checkout.
            tracing::warn!("Skipping {}: not a regular file", src_path.display());
        }
    }
    Ok(())
}
