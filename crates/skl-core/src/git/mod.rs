//! Git operations for fetching skills from repositories.
//!
//! This module provides:
//! - [`GitClient`]: the narrow set of git operations skl needs
//! - [`SystemGit`]: implementation that shells out to `git`
//! - [`SkillFetcher`]: sparse clone, path resolution and materialization
//! - [`FetchError`]: user-facing failure taxonomy

mod client;
mod error;
mod fetcher;

pub use client::{GitClient, GitError, RemoteRef, SystemGit};
pub use error::{FetchError, classify_clone_error};
pub use fetcher::{
    FetchRequest, InstalledPackage, PRIMARY_ROOT, FALLBACK_ROOT, SKILL_MARKER, SkillFetcher,
    conventional_paths, override_subtree,
};
