// GitHub provider implementation - bridges API client with ProfileSource trait
use async_trait::async_trait;
use gitfolio_api::{GitHubClient, GitHubRepo, GitHubUser, StarredCount};

use crate::{
    loader::ProfileSource,
    models::{Account, Repository},
    Result,
};

/// Wrapper around GitHubClient that implements ProfileSource
pub struct GitHubProvider {
    client: GitHubClient,
}

impl GitHubProvider {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProfileSource for GitHubProvider {
    async fn fetch_account(&self, handle: &str) -> Result<Account> {
        let user = self.client.fetch_account(handle).await?;
        Ok(github_to_account(user))
    }

    async fn fetch_repositories(&self, handle: &str) -> Result<Vec<Repository>> {
        let repos = self.client.fetch_repositories(handle).await?;
        Ok(repos.into_iter().map(github_to_repo).collect())
    }

    async fn fetch_starred_count(&self, handle: &str) -> Result<StarredCount> {
        Ok(self.client.fetch_starred_count(handle).await?)
    }

    async fn fetch_languages(&self, languages_url: &str) -> Result<Vec<String>> {
        Ok(self.client.fetch_languages(languages_url).await?)
    }
}

fn github_to_account(gh: GitHubUser) -> Account {
    Account {
        login: gh.login,
        name: gh.name,
        avatar_url: gh.avatar_url,
        profile_url: gh.html_url,
        bio: gh.bio,
        followers: gh.followers,
        following: gh.following,
        public_repos: gh.public_repos,
    }
}

/// Convert GitHub API repo to our internal Repository model
fn github_to_repo(gh: GitHubRepo) -> Repository {
    Repository {
        name: gh.name,
        description: gh.description,
        url: gh.html_url,
        stars: gh.stargazers_count,
        forks: gh.forks_count,
        updated_at: gh.updated_at,
        language: gh.language,
        topics: gh.topics,
        is_fork: gh.fork,
        parent_language: gh.parent.and_then(|p| p.language),
        languages_url: gh.languages_url,
        languages: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fork_keeps_parent_language() {
        let gh: GitHubRepo = serde_json::from_value(serde_json::json!({
            "name": "forked",
            "description": null,
            "html_url": "https://github.com/o/forked",
            "stargazers_count": 0,
            "forks_count": 0,
            "updated_at": "2023-06-01T00:00:00Z",
            "language": null,
            "fork": true,
            "parent": { "language": "Go" }
        }))
        .unwrap();

        let repo = github_to_repo(gh);
        assert!(repo.is_fork);
        assert_eq!(repo.language, None);
        assert_eq!(repo.parent_language.as_deref(), Some("Go"));
    }
}
