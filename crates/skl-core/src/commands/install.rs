//! Install command implementation.
//!
//! Fetches one package, registers it in the manifest and pins it in the lock.

use std::path::PathBuf;

use anyhow::Context;

use super::packages::{PackageManager, ignore_lock_file};
use crate::context::AppContext;
use crate::reference::PackageRef;

/// Options for the install command
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// `provider@owner/repo/package[:ref]` or `local@package`
    pub reference: String,
    /// Replace an existing package directory
    pub force: bool,
}

impl InstallOptions {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            force: false,
        }
    }

    /// Set the force flag
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// Report from an install operation
#[derive(Debug, Clone)]
pub struct InstallReport {
    /// Manifest key of the package
    pub key: String,
    pub package_id: String,
    /// Where the package now lives
    pub path: PathBuf,
    /// Repository path it was taken from (remote packages only)
    pub subtree: Option<String>,
    /// Value written to the manifest
    pub manifest_value: String,
    /// Value written to the lock
    pub locked: String,
    /// Whether `.gitignore` was updated
    pub gitignore_updated: bool,
}

/// Install command orchestrator
#[derive(Debug)]
pub struct InstallCommand<'a> {
    ctx: &'a AppContext,
}

impl<'a> InstallCommand<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    pub fn execute(&self, options: &InstallOptions) -> anyhow::Result<InstallReport> {
        let package = PackageRef::parse(&options.reference)?;
        let key = package.key();
        tracing::info!("Installing {}", package);

        let materialized = PackageManager::new(self.ctx).materialize(&package, options.force)?;

        let store = self.ctx.state_store();
        let manifest_value = package.manifest_value();

        let mut manifest = store.load_manifest()?;
        manifest.insert(key.clone(), manifest_value.clone());
        store
            .save_manifest(&manifest)
            .context("Package installed but the manifest could not be updated")?;

        let mut lock = store.load_lock()?;
        lock.insert(key.clone(), materialized.locked.clone());
        store
            .save_lock(&lock)
            .context("Package installed but the lock could not be updated")?;

        let gitignore_updated = ignore_lock_file(self.ctx);

        Ok(InstallReport {
            key,
            package_id: package.package_id().to_string(),
            path: materialized.path,
            subtree: materialized.subtree,
            manifest_value,
            locked: materialized.locked,
            gitignore_updated,
        })
    }
}
