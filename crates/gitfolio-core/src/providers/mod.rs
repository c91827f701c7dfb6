// Provider implementations for profile data
pub mod github;

pub use github::GitHubProvider;
