//! Git client abstraction and the `git` subprocess implementation.

use std::path::Path;
use std::process::Command;

use thiserror::Error;

/// Environment variables that would redirect git away from the directory
/// we point it at.
const GIT_ENV_OVERRIDES: [&str; 4] = [
    "GIT_DIR",
    "GIT_WORK_TREE",
    "GIT_INDEX_FILE",
    "GIT_COMMON_DIR",
];

#[derive(Debug, Error)]
pub enum GitError {
    #[error("Failed to run git {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {command} failed: {}", .stderr.trim())]
    Failed { command: String, stderr: String },
}

impl GitError {
    /// Raw diagnostic text, used for error classification.
    pub fn diagnostics(&self) -> String {
        match self {
            Self::Spawn { source, .. } => source.to_string(),
            Self::Failed { stderr, .. } => stderr.clone(),
        }
    }
}

/// One line of `git ls-remote` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
    pub sha: String,
    pub name: String,
}

/// The git operations needed to fetch a package subtree.
pub trait GitClient: Send + Sync + std::fmt::Debug {
    /// Clone metadata only: no blobs, no history beyond the tip, no
    /// working tree. `reference` pins a branch or tag.
    fn clone_narrow(&self, url: &str, dest: &Path, reference: Option<&str>)
    -> Result<(), GitError>;

    /// Whether `path` exists in the HEAD tree of `repo_dir`.
    fn tree_contains(&self, repo_dir: &Path, path: &str) -> Result<bool, GitError>;

    /// Restrict the working tree to `path` (empty means the whole tree).
    fn select_subtree(&self, repo_dir: &Path, path: &str) -> Result<(), GitError>;

    /// Materialize the selected subtree.
    fn checkout(&self, repo_dir: &Path) -> Result<(), GitError>;

    /// List remote refs matching `pattern`.
    fn ls_remote(&self, url: &str, pattern: &str) -> Result<Vec<RemoteRef>, GitError>;
}

/// [`GitClient`] backed by the `git` executable.
#[derive(Debug, Clone, Default)]
pub struct SystemGit;

impl SystemGit {
    pub fn new() -> Self {
        Self
    }

    /// Fail unless the installed git supports `sparse-checkout`.
    pub fn ensure_version(&self) -> anyhow::Result<()> {
        let banner = self.run(None, &["--version"])?;
        let (major, minor) = parse_git_version(&banner)
            .ok_or_else(|| anyhow::anyhow!("Unrecognized `git --version` output: {}", banner))?;
        if (major, minor) < MIN_GIT_VERSION {
            anyhow::bail!(
                "git {}.{} found; skl needs {}.{} or newer for sparse checkouts",
                major,
                minor,
                MIN_GIT_VERSION.0,
                MIN_GIT_VERSION.1
            );
        }
        Ok(())
    }

    fn command(cwd: Option<&Path>) -> Command {
        let mut cmd = Command::new("git");
        for key in GIT_ENV_OVERRIDES {
            cmd.env_remove(key);
        }
        // Never block on a credential prompt.
        cmd.env("GIT_TERMINAL_PROMPT", "0");
        if let Some(dir) = cwd {
            cmd.arg("-C").arg(dir);
        }
        cmd
    }

    /// Run a git command and return its stdout.
    fn run(&self, cwd: Option<&Path>, args: &[&str]) -> Result<String, GitError> {
        let command = args.join(" ");
        tracing::debug!("git {}", command);

        let output = Self::command(cwd)
            .args(args)
            .output()
            .map_err(|source| GitError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(GitError::Failed {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl GitClient for SystemGit {
    fn clone_narrow(
        &self,
        url: &str,
        dest: &Path,
        reference: Option<&str>,
    ) -> Result<(), GitError> {
        let dest = dest.to_string_lossy();
        let mut args = vec![
            "clone",
            "--filter=blob:none",
            "--sparse",
            "--depth=1",
            "--no-checkout",
        ];
        if let Some(reference) = reference {
            args.extend(["--branch", reference]);
        }
        args.extend([url, dest.as_ref()]);
        self.run(None, &args).map(|_| ())
    }

    fn tree_contains(&self, repo_dir: &Path, path: &str) -> Result<bool, GitError> {
        let stdout = self.run(Some(repo_dir), &["ls-tree", "HEAD", path])?;
        Ok(!stdout.trim().is_empty())
    }

    fn select_subtree(&self, repo_dir: &Path, path: &str) -> Result<(), GitError> {
        if path.is_empty() {
            self.run(Some(repo_dir), &["sparse-checkout", "disable"])?;
        } else {
            self.run(Some(repo_dir), &["sparse-checkout", "set", path])?;
        }
        Ok(())
    }

    fn checkout(&self, repo_dir: &Path) -> Result<(), GitError> {
        self.run(Some(repo_dir), &["checkout"]).map(|_| ())
    }

    fn ls_remote(&self, url: &str, pattern: &str) -> Result<Vec<RemoteRef>, GitError> {
        let stdout = self.run(None, &["ls-remote", url, pattern])?;
        Ok(parse_ls_remote(&stdout))
    }
}

/// Oldest git with the `sparse-checkout` subcommand.
const MIN_GIT_VERSION: (u32, u32) = (2, 25);

/// `(major, minor)` from a banner such as `git version 2.39.2 (Apple Git-143)`.
pub(crate) fn parse_git_version(banner: &str) -> Option<(u32, u32)> {
    let version = banner
        .split_whitespace()
        .find(|word| word.starts_with(|c: char| c.is_ascii_digit()))?;
    let mut numbers = version.split('.').map(|part| part.parse::<u32>().ok());
    Some((numbers.next()??, numbers.next()??))
}

/// Parse `<sha>\t<ref>` lines.
pub(crate) fn parse_ls_remote(stdout: &str) -> Vec<RemoteRef> {
    stdout
        .lines()
        .filter_map(|line| {
            let (sha, name) = line.split_once('\t')?;
            let sha = sha.trim();
            if sha.is_empty() {
                return None;
            }
            Some(RemoteRef {
                sha: sha.to_string(),
                name: name.trim().to_string(),
            })
        })
        .collect()
}
