//! Package and repository reference types.
//!
//! Grammar:
//! - `provider@owner/repo/package[:ref]`
//! - `local@package`
//! - `provider@owner/repo[:ref]` (repository-only form)

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Provider id for packages that live only in the project.
pub const LOCAL_PROVIDER: &str = "local";

/// Ref sentinel meaning "unspecified / track latest".
pub const ANY_REF: &str = "*";

static PACKAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([A-Za-z0-9-]+)@([A-Za-z0-9._-]+)/([A-Za-z0-9._-]+)/([A-Za-z0-9._-]+)(?::([A-Za-z0-9._-]+))?$",
    )
    .expect("package reference pattern is valid")
});

static REPO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9-]+)@([A-Za-z0-9._-]+)/([A-Za-z0-9._-]+)(?::([A-Za-z0-9._-]+))?$")
        .expect("repository reference pattern is valid")
});

static LOCAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^local@([A-Za-z0-9._-]+)$").expect("local reference pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error(
        "invalid package reference: {input:?}\n  Expected: <provider>@<owner>/<repo>/<package>[:ref] or local@<package>\n  Example: github@acme/skills/data-analyzer:v1.2.0 or local@my-skill"
    )]
    Malformed { input: String },

    #[error(
        "invalid repository reference: {input:?}\n  Expected: <provider>@<owner>/<repo>[:ref]\n  Example: github@acme/skills"
    )]
    MalformedRepo { input: String },
}

/// A repository on a hosting provider, optionally pinned to a ref.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub provider: String,
    pub owner: String,
    pub repo: String,
    pub reference: Option<String>,
}

impl RepoRef {
    pub fn new(
        provider: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            owner: owner.into(),
            repo: repo.into(),
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Parse `provider@owner/repo[:ref]`.
    pub fn parse(raw: &str) -> Result<Self, ReferenceError> {
        let trimmed = raw.strip_suffix('/').unwrap_or(raw);
        let caps = REPO_PATTERN
            .captures(trimmed)
            .ok_or_else(|| ReferenceError::MalformedRepo {
                input: raw.to_string(),
            })?;

        if &caps[1] == LOCAL_PROVIDER {
            return Err(ReferenceError::MalformedRepo {
                input: raw.to_string(),
            });
        }

        Ok(Self {
            provider: caps[1].to_string(),
            owner: caps[2].to_string(),
            repo: caps[3].to_string(),
            reference: caps.get(4).map(|m| m.as_str().to_string()),
        })
    }

    /// `provider@owner/repo`, without the ref.
    pub fn key(&self) -> String {
        format!("{}@{}/{}", self.provider, self.owner, self.repo)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())?;
        if let Some(reference) = &self.reference {
            write!(f, ":{}", reference)?;
        }
        Ok(())
    }
}

/// A fully-qualified package reference.
///
/// The identity key (used in manifest and lock) never includes the ref.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PackageRef {
    /// A package that exists only in the project (`local@<package>`).
    Local { package_id: String },
    /// A package inside a hosted repository.
    Remote { repo: RepoRef, package_id: String },
}

impl PackageRef {
    /// Parse `provider@owner/repo/package[:ref]` or `local@package`.
    ///
    /// A single trailing slash is ignored.
    pub fn parse(raw: &str) -> Result<Self, ReferenceError> {
        let trimmed = raw.strip_suffix('/').unwrap_or(raw);

        if let Some(caps) = LOCAL_PATTERN.captures(trimmed) {
            return Ok(Self::Local {
                package_id: caps[1].to_string(),
            });
        }

        let caps = PACKAGE_PATTERN
            .captures(trimmed)
            .ok_or_else(|| ReferenceError::Malformed {
                input: raw.to_string(),
            })?;

        if &caps[1] == LOCAL_PROVIDER {
            return Err(ReferenceError::Malformed {
                input: raw.to_string(),
            });
        }

        Ok(Self::Remote {
            repo: RepoRef {
                provider: caps[1].to_string(),
                owner: caps[2].to_string(),
                repo: caps[3].to_string(),
                reference: caps.get(5).map(|m| m.as_str().to_string()),
            },
            package_id: caps[4].to_string(),
        })
    }

    /// Build a reference from a manifest/lock entry.
    ///
    /// The entry value is authoritative for the ref; any `:ref` suffix in
    /// the key is discarded. `*` and empty values mean "no ref".
    pub fn from_entry(key: &str, value: &str) -> Result<Self, ReferenceError> {
        Ok(Self::parse(key)?.with_reference(ref_from_value(value)))
    }

    pub fn with_reference(self, reference: Option<String>) -> Self {
        match self {
            Self::Local { package_id } => Self::Local { package_id },
            Self::Remote { mut repo, package_id } => {
                repo.reference = reference;
                Self::Remote { repo, package_id }
            }
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local { .. })
    }

    pub fn provider(&self) -> &str {
        match self {
            Self::Local { .. } => LOCAL_PROVIDER,
            Self::Remote { repo, .. } => &repo.provider,
        }
    }

    pub fn owner(&self) -> Option<&str> {
        self.repo().map(|r| r.owner.as_str())
    }

    pub fn repo_name(&self) -> Option<&str> {
        self.repo().map(|r| r.repo.as_str())
    }

    pub fn repo(&self) -> Option<&RepoRef> {
        match self {
            Self::Local { .. } => None,
            Self::Remote { repo, .. } => Some(repo),
        }
    }

    pub fn package_id(&self) -> &str {
        match self {
            Self::Local { package_id } | Self::Remote { package_id, .. } => package_id,
        }
    }

    pub fn reference(&self) -> Option<&str> {
        self.repo().and_then(|r| r.reference.as_deref())
    }

    /// Identity key: `provider@owner/repo/package` or `local@package`.
    pub fn key(&self) -> String {
        match self {
            Self::Local { package_id } => format!("{}@{}", LOCAL_PROVIDER, package_id),
            Self::Remote { repo, package_id } => format!("{}/{}", repo.key(), package_id),
        }
    }

    /// Value recorded in the manifest for this reference.
    pub fn manifest_value(&self) -> String {
        self.reference().unwrap_or(ANY_REF).to_string()
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())?;
        if let Some(reference) = self.reference() {
            write!(f, ":{}", reference)?;
        }
        Ok(())
    }
}

/// Map a manifest value to an optional git ref.
pub fn ref_from_value(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value == ANY_REF {
        None
    } else {
        Some(value.to_string())
    }
}

/// Package name for a manifest key, tolerating keys that do not parse.
///
/// `github@acme/skills/linter` → `linter`, `local@notes` → `notes`.
pub fn package_name_from_key(key: &str) -> &str {
    let last = key.rsplit(['/', '@']).next().unwrap_or(key);
    last.split(':').next().unwrap_or(last)
}
