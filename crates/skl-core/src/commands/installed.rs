//! List installed packages alongside their manifest and lock entries.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::context::AppContext;
use crate::reference::package_name_from_key;
use crate::skills::list_installed;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledEntry {
    pub name: String,
    pub path: PathBuf,
    pub has_marker: bool,
    /// Manifest key naming this directory, if any
    pub key: Option<String>,
    pub manifest_value: Option<String>,
    pub locked: Option<String>,
}

/// Installed command orchestrator
#[derive(Debug)]
pub struct InstalledCommand<'a> {
    ctx: &'a AppContext,
}

impl<'a> InstalledCommand<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    pub fn execute(&self) -> anyhow::Result<Vec<InstalledEntry>> {
        let store = self.ctx.state_store();
        let manifest = store.load_manifest()?;
        let lock = store.load_lock()?;

        let mut by_name: HashMap<&str, &str> = HashMap::new();
        for key in manifest.keys() {
            by_name
                .entry(package_name_from_key(key))
                .or_insert(key.as_str());
        }

        let entries = list_installed(&self.ctx.skills_root())?
            .into_iter()
            .map(|skill| {
                let key = by_name.get(skill.name.as_str()).map(|k| k.to_string());
                let manifest_value = key.as_ref().and_then(|k| manifest.get(k)).cloned();
                let locked = key.as_ref().and_then(|k| lock.get(k)).cloned();
                InstalledEntry {
                    name: skill.name,
                    path: skill.path,
                    has_marker: skill.has_marker,
                    key,
                    manifest_value,
                    locked,
                }
            })
            .collect();
        Ok(entries)
    }
}
