use super::{Provider, effective_ref};

/// bitbucket.org repositories.
#[derive(Debug, Default, Clone, Copy)]
pub struct BitbucketProvider;

impl BitbucketProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Provider for BitbucketProvider {
    fn name(&self) -> &str {
        "bitbucket"
    }

    fn clone_url(&self, owner: &str, repo: &str) -> String {
        format!("git@bitbucket.org:{}/{}.git", owner, repo)
    }

    fn browse_url(&self, owner: &str, repo: &str) -> String {
        format!("https://bitbucket.org/{}/{}", owner, repo)
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
            "https://bitbucket.org/{}/{}/raw/{}/{}",
            owner,
            repo,
            git_ref,
            path.trim_start_matches('/')
        )
    }
}
