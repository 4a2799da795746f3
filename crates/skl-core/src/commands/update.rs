//! Update command implementation.
//!
//! Reconciles the manifest against the lock and persists the new lock.

use std::path::PathBuf;

use super::packages::{PackageManager, ignore_lock_file};
use crate::context::AppContext;
use crate::reconcile::{ReconcileReport, reconcile};

/// Report from an update run
#[derive(Debug)]
pub struct UpdateReport {
    pub manifest_path: PathBuf,
    /// `None` when the project has no manifest
    pub result: Option<ReconcileReport>,
    /// Whether the lock file was rewritten
    pub lock_written: bool,
}

impl UpdateReport {
    pub fn manifest_found(&self) -> bool {
        self.result.is_some()
    }

    pub fn failed(&self) -> usize {
        self.result.as_ref().map_or(0, ReconcileReport::failed)
    }
}

/// Update command orchestrator
#[derive(Debug)]
pub struct UpdateCommand<'a> {
    ctx: &'a AppContext,
}

impl<'a> UpdateCommand<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    pub fn execute(&self) -> anyhow::Result<UpdateReport> {
        let store = self.ctx.state_store();
        let manifest_path = store.manifest().path().to_path_buf();

        if !store.manifest().exists() {
            tracing::info!("No manifest at {}", manifest_path.display());
            return Ok(UpdateReport {
                manifest_path,
                result: None,
                lock_written: false,
            });
        }

        let desired = store.load_manifest()?;
        let locked = store.load_lock()?;

        let manager = PackageManager::new(self.ctx);
        let report = reconcile(&desired, &locked, &manager);

        let lock_written = report.lock != locked || !store.lock().exists();
        if lock_written {
            store.save_lock(&report.lock)?;
        }
        if lock_written {
            ignore_lock_file(self.ctx);
        }

        tracing::info!(
            "Update finished: {}/{} succeeded",
            report.succeeded(),
            report.total()
        );
        Ok(UpdateReport {
            manifest_path,
            result: Some(report),
            lock_written,
        })
    }
}
