// GitHub REST client for public profile data
pub mod github;
pub mod link;

// Re-export common types
pub use github::{
    GitHubClient, GitHubError, GitHubParent, GitHubRepo, GitHubUser, StarredCount,
    GITHUB_API_BASE, REPOS_PER_PAGE, STARRED_PER_PAGE,
};
pub use link::LinkRelation;
