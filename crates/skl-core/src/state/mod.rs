//! Manifest and lock persistence.
//!
//! Both files share the same shape, `{"skills": {"<key>": "<ref>"}}`:
//! - `sklfile.json`: desired state, edited by the user
//! - `sklfile.lock`: resolved state, written by skl
//!
//! A missing file loads as an empty mapping. Writes go to a temp file in
//! the same directory which is then renamed over the target, so a crash
//! never leaves a half-written file behind.

mod gitignore;

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub use gitignore::ensure_gitignore_entry;

/// Default manifest file name.
pub const MANIFEST_FILE: &str = "sklfile.json";

/// Default lock file name.
pub const LOCK_FILE: &str = "sklfile.lock";

/// Package key → ref. Ordered so files stay diff-friendly.
pub type SkillMap = BTreeMap<String, String>;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateDocument {
    #[serde(default)]
    skills: SkillMap,
}

/// One state file on disk.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the mapping. A missing file yields an empty mapping.
    pub fn load(&self) -> anyhow::Result<SkillMap> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SkillMap::new());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read {}", self.path.display()));
            }
        };

        let document: StateDocument = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        Ok(document.skills)
    }

    /// Save the mapping atomically (temp file + rename).
    pub fn save(&self, skills: &SkillMap) -> anyhow::Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;

        let document = StateDocument {
            skills: skills.clone(),
        };
        let mut bytes = serde_json::to_vec_pretty(&document)
            .with_context(|| format!("Failed to serialize {}", self.path.display()))?;
        bytes.push(b'\n');

        let mut tmp = tempfile::NamedTempFile::new_in(&parent).with_context(|| {
            format!("Failed to create temp file in {}", parent.display())
        })?;
        tmp.write_all(&bytes)
            .with_context(|| format!("Failed to write temp file for {}", self.path.display()))?;
        tmp.as_file()
            .sync_all()
            .with_context(|| format!("Failed to flush temp file for {}", self.path.display()))?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        Ok(())
    }
}

/// Keys in lexicographic order, for deterministic reporting.
pub fn sorted_keys(skills: &SkillMap) -> Vec<&str> {
    skills.keys().map(String::as_str).collect()
}

/// The manifest and lock of one project.
#[derive(Debug, Clone)]
pub struct StateStore {
    manifest: StateFile,
    lock: StateFile,
}

impl StateStore {
    pub fn new(project_root: &Path, manifest_name: &str, lock_name: &str) -> Self {
        Self {
            manifest: StateFile::new(project_root.join(manifest_name)),
            lock: StateFile::new(project_root.join(lock_name)),
        }
    }

    /// Store using the default file names.
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root, MANIFEST_FILE, LOCK_FILE)
    }

    pub fn manifest(&self) -> &StateFile {
        &self.manifest
    }

    pub fn lock(&self) -> &StateFile {
        &self.lock
    }

    pub fn load_manifest(&self) -> anyhow::Result<SkillMap> {
        self.manifest.load()
    }

    pub fn load_lock(&self) -> anyhow::Result<SkillMap> {
        self.lock.load()
    }

    pub fn save_manifest(&self, skills: &SkillMap) -> anyhow::Result<()> {
        self.manifest.save(skills)
    }

    pub fn save_lock(&self, skills: &SkillMap) -> anyhow::Result<()> {
        self.lock.save(skills)
    }
}
