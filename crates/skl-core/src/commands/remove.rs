//! Remove command implementation.
//!
//! Deletes a package directory and drops its entries from manifest and lock.

use std::path::PathBuf;

use crate::context::AppContext;
use crate::reference::{PackageRef, package_name_from_key};
use crate::skills::{package_dir, remove_package_dir, validate_package_name};
use crate::state::SkillMap;

/// Report from a remove operation
#[derive(Debug, Clone)]
pub struct RemoveReport {
    pub name: String,
    pub path: PathBuf,
    /// Whether the package directory existed and was deleted
    pub removed_dir: bool,
    /// Keys dropped from the manifest
    pub manifest_keys: Vec<String>,
    /// Keys dropped from the lock
    pub lock_keys: Vec<String>,
}

impl RemoveReport {
    pub fn changed(&self) -> bool {
        self.removed_dir || !self.manifest_keys.is_empty() || !self.lock_keys.is_empty()
    }
}

/// Remove command orchestrator
#[derive(Debug)]
pub struct RemoveCommand<'a> {
    ctx: &'a AppContext,
}

impl<'a> RemoveCommand<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    /// Remove by package name, or by a full reference.
    pub fn execute(&self, target: &str) -> anyhow::Result<RemoveReport> {
        let name = match PackageRef::parse(target) {
            Ok(package) => package.package_id().to_string(),
            Err(_) => target.to_string(),
        };
        validate_package_name(&name)?;

        let skills_root = self.ctx.skills_root();
        let removed_dir = remove_package_dir(&skills_root, &name)?;

        let store = self.ctx.state_store();
        let mut manifest = store.load_manifest()?;
        let manifest_keys = drop_package(&mut manifest, &name);
        if !manifest_keys.is_empty() {
            store.save_manifest(&manifest)?;
        }

        let mut lock = store.load_lock()?;
        let lock_keys = drop_package(&mut lock, &name);
        if !lock_keys.is_empty() {
            store.save_lock(&lock)?;
        }

        let report = RemoveReport {
            path: package_dir(&skills_root, &name),
            name,
            removed_dir,
            manifest_keys,
            lock_keys,
        };
        if !report.changed() {
            anyhow::bail!("Package {:?} is not installed", report.name);
        }
        tracing::info!("Removed {}", report.name);
        Ok(report)
    }
}

/// Drop every key naming `name`; returns the dropped keys.
fn drop_package(skills: &mut SkillMap, name: &str) -> Vec<String> {
    let keys: Vec<String> = skills
        .keys()
        .filter(|key| package_name_from_key(key) == name)
        .cloned()
        .collect();
    for key in &keys {
        skills.remove(key);
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_all_keys_for_name() {
        let mut skills: SkillMap = [
            ("github@acme/x/fmt", "*"),
            ("bitbucket@team/y/fmt", "v1"),
            ("github@acme/x/lint", "*"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let dropped = drop_package(&mut skills, "fmt");

        assert_eq!(dropped, vec!["bitbucket@team/y/fmt", "github@acme/x/fmt"]);
        assert_eq!(skills.len(), 1);
        assert!(skills.contains_key("github@acme/x/lint"));
    }
}
