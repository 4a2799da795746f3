use super::{Provider, effective_ref};

/// github.com repositories.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitHubProvider;

impl GitHubProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Provider for GitHubProvider {
    fn name(&self) -> &str {
        "github"
    }

    fn clone_url(&self, owner: &str, repo: &str) -> String {
        format!("git@github.com:{}/{}.git", owner, repo)
    }

    fn browse_url(&self, owner: &str, repo: &str) -> String {
        format!("https://github.com/{}/{}", owner, repo)
    }

    fn raw_file_url(
        &self,
        owner: &str,
        repo: &str,
        reference: Option<&str>,
        path: &str,
    ) -> String {
        let git_ref = effective_ref(self, reference);
        format!(
            "https://raw.githubusercontent.com/{}/{}/{}/{}",
            owner,
            repo,
            git_ref,
            path.trim_start_matches('/')
        )
    }
}
