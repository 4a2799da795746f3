//! Installed package directories under the skills root.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::git::SKILL_MARKER;

/// A package directory found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledSkill {
    pub name: String,
    pub path: PathBuf,
    /// Whether the directory carries a `SKILL.md`.
    pub has_marker: bool,
}

/// List immediate, non-hidden subdirectories of `root`, sorted by name.
///
/// A missing root yields an empty list.
pub fn list_installed(root: &Path) -> anyhow::Result<Vec<InstalledSkill>> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", root.display()));
        }
    };

    let mut skills = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read {}", root.display()))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        skills.push(InstalledSkill {
            has_marker: path.join(SKILL_MARKER).is_file(),
            name,
            path,
        });
    }
    skills.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(skills)
}

/// Reject names that would escape the skills root.
pub fn validate_package_name(name: &str) -> anyhow::Result<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.starts_with('.')
    {
        anyhow::bail!("Invalid package name {:?}", name);
    }
    Ok(())
}

/// Directory of package `name` under `root`.
pub fn package_dir(root: &Path, name: &str) -> PathBuf {
    root.join(name)
}

/// Delete the package directory. Returns whether anything was removed.
pub fn remove_package_dir(root: &Path, name: &str) -> anyhow::Result<bool> {
    validate_package_name(name)?;
    let dir = package_dir(root, name);
    match std::fs::remove_dir_all(&dir) {
        Ok(()) => {
            tracing::debug!("Removed {}", dir.display());
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", dir.display())),
    }
}
