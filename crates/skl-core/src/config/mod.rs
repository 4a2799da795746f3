//! Configuration for skl.
//!
//! Settings are layered, each layer overriding only the keys it sets:
//! - Built-in defaults
//! - Global: `<config_dir>/skl/config.toml`
//! - Project: `./skl.toml`

mod parser;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::state::{LOCK_FILE, MANIFEST_FILE};

pub use parser::{parse_config_override, parse_config_override_str};

/// Global config file name inside the global config directory.
pub const GLOBAL_CONFIG_FILE: &str = "config.toml";

/// Project config file name at the project root.
pub const PROJECT_CONFIG_FILE: &str = "skl.toml";

/// Effective settings after all layers are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SklConfig {
    /// Skills root, relative to the project root.
    pub skills_dir: String,
    pub manifest_file: String,
    pub lock_file: String,
    /// Timeout for the catalog HTTP request.
    pub catalog_timeout_ms: u64,
    /// Add the lock file to an existing `.gitignore` after installs.
    pub manage_gitignore: bool,
}

impl Default for SklConfig {
    fn default() -> Self {
        Self {
            skills_dir: ".agent/skills".to_string(),
            manifest_file: MANIFEST_FILE.to_string(),
            lock_file: LOCK_FILE.to_string(),
            catalog_timeout_ms: 2000,
            manage_gitignore: true,
        }
    }
}

/// One configuration layer; unset keys leave the lower layer untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SklConfigOverride {
    pub skills_dir: Option<String>,
    pub manifest_file: Option<String>,
    pub lock_file: Option<String>,
    pub catalog_timeout_ms: Option<u64>,
    pub manage_gitignore: Option<bool>,
}

impl SklConfig {
    /// Load defaults, then the global and project layers when present.
    pub fn load(global_config_dir: &Path, project_root: &Path) -> anyhow::Result<Self> {
        let mut config = Self::default();
        for path in [
            global_config_dir.join(GLOBAL_CONFIG_FILE),
            project_root.join(PROJECT_CONFIG_FILE),
        ] {
            if path.is_file() {
                tracing::debug!("Applying config layer {}", path.display());
                config.apply(parse_config_override(&path)?);
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Overlay a layer onto these settings.
    pub fn apply(&mut self, layer: SklConfigOverride) {
        if let Some(skills_dir) = layer.skills_dir {
            self.skills_dir = skills_dir;
        }
        if let Some(manifest_file) = layer.manifest_file {
            self.manifest_file = manifest_file;
        }
        if let Some(lock_file) = layer.lock_file {
            self.lock_file = lock_file;
        }
        if let Some(timeout) = layer.catalog_timeout_ms {
            self.catalog_timeout_ms = timeout;
        }
        if let Some(manage) = layer.manage_gitignore {
            self.manage_gitignore = manage;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let skills_dir = self.skills_dir.trim();
        if skills_dir.is_empty() {
            anyhow::bail!("skills_dir must not be empty");
        }
        if Path::new(skills_dir).is_absolute() {
            anyhow::bail!(
                "skills_dir must be relative to the project root, got {:?}",
                self.skills_dir
            );
        }
        for (field, value) in [
            ("manifest_file", &self.manifest_file),
            ("lock_file", &self.lock_file),
        ] {
            if value.trim().is_empty() || value.contains(['/', '\\']) {
                anyhow::bail!("{} must be a plain file name, got {:?}", field, value);
            }
        }
        if self.manifest_file == self.lock_file {
            anyhow::bail!("manifest_file and lock_file must differ");
        }
        if self.catalog_timeout_ms == 0 {
            anyhow::bail!("catalog_timeout_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_millis(self.catalog_timeout_ms)
    }

    /// Absolute skills root for `project_root`.
    pub fn skills_root(&self, project_root: &Path) -> PathBuf {
        project_root.join(self.skills_dir.trim())
    }
}
