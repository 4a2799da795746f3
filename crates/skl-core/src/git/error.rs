//! Fetch failure taxonomy and clone diagnostic classification.

use std::path::PathBuf;

use thiserror::Error;

/// Why fetching a package failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(
        "package {package:?} already exists at {}\n\n  Remove it first or reinstall with --force",
        .path.display()
    )]
    AlreadyExists { package: String, path: PathBuf },

    #[error(
        "repository not found\n\n  Check that the repository exists and that you have access: {browse_url}"
    )]
    RepositoryNotFound { browse_url: String },

    #[error(
        "ref {reference:?} not found in repository\n\n  Check the available branches and tags at: {browse_url}"
    )]
    RefNotFound {
        reference: String,
        browse_url: String,
    },

    #[error(
        "permission denied while accessing the repository\n\n  Check your credentials (SSH key or token) for: {browse_url}"
    )]
    PermissionDenied { browse_url: String },

    #[error("failed to clone repository {browse_url}\n\n  {}", .detail.trim())]
    CloneFailed { browse_url: String, detail: String },

    #[error(
        "package {package:?} not found in repository\n  Expected path: {expected}\n  Tried: {}\n\n  Browse the repository at: {browse_url}",
        .tried.join(", ")
    )]
    PackageNotFound {
        package: String,
        expected: String,
        tried: Vec<String>,
        browse_url: String,
    },

    #[error("file {file:?} not found in package {package:?}")]
    FileNotFound { file: String, package: String },

    #[error("git {operation} failed: {}", .detail.trim())]
    Git {
        operation: &'static str,
        detail: String,
    },

    #[error("failed to resolve ref {reference:?}: {}", .detail.trim())]
    RefResolution { reference: String, detail: String },

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

const REF_PHRASES: [&str; 3] = ["not a valid ref", "remote branch", "not found in upstream"];
const MISSING_PHRASES: [&str; 2] = ["not found", "does not exist"];
const PERMISSION_PHRASES: [&str; 2] = ["permission denied", "could not read from remote"];

/// Map raw clone diagnostics to a [`FetchError`].
///
/// Matching is case-insensitive, checked in order: an explicit "repository
/// not found", ref phrases (only when a ref was requested), generic missing
/// phrases, then permission phrases.
pub fn classify_clone_error(
    diagnostics: &str,
    browse_url: &str,
    reference: Option<&str>,
) -> FetchError {
    let lower = diagnostics.to_lowercase();
    let browse_url = browse_url.to_string();

    if lower.contains("repository not found") {
        return FetchError::RepositoryNotFound { browse_url };
    }

    if let Some(reference) = reference
        && REF_PHRASES.iter().any(|phrase| lower.contains(phrase))
    {
        return FetchError::RefNotFound {
            reference: reference.to_string(),
            browse_url,
        };
    }

    if MISSING_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
        return FetchError::RepositoryNotFound { browse_url };
    }

    if PERMISSION_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
        return FetchError::PermissionDenied { browse_url };
    }

    FetchError::CloneFailed {
        browse_url,
        detail: diagnostics.to_string(),
    }
}
