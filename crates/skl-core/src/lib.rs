//! skl Core Library
//!
//! Provides the domain logic for managing project-local skill packages
//! fetched from git repositories: reference parsing, provider URLs,
//! catalog lookup, manifest/lock persistence, reconciliation and the
//! sparse-checkout fetcher.

pub mod catalog;
pub mod commands;
pub mod config;
pub mod context;
pub mod git;
pub mod provider;
pub mod reconcile;
pub mod reference;
pub mod skills;
pub mod state;

/// Re-exports of commonly used types
pub mod prelude {
    // References
    pub use crate::reference::{PackageRef, ReferenceError, RepoRef};

    // Providers
    pub use crate::provider::{Provider, ProviderError, ProviderRegistry};

    // Catalog
    pub use crate::catalog::{Catalog, CatalogEntry, CatalogSource, HttpCatalogSource};

    // State
    pub use crate::state::{SkillMap, StateFile, StateStore};

    // Reconciliation
    pub use crate::reconcile::{PackageActions, ReconcilePlan, ReconcileReport};

    // Git
    pub use crate::git::{FetchError, FetchRequest, GitClient, SkillFetcher, SystemGit};

    // Configuration
    pub use crate::config::SklConfig;
    pub use crate::context::AppContext;
}
