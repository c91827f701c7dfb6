use chrono::{DateTime, Duration, Utc};
use gitfolio_cache::CacheManager;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::link;

pub const GITHUB_API_BASE: &str = "https://api.github.com/users";
pub const REPOS_PER_PAGE: u32 = 100;
pub const STARRED_PER_PAGE: u32 = 50;

const DEFAULT_TTL_MINUTES: i64 = 15;
const USER_AGENT: &str = concat!("gitfolio/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Network connection unavailable: {0}")]
    Offline(String),

    #[error("API request failed: {0}")]
    Request(String),

    #[error("JSON parsing failed: {0}")]
    Parse(#[from] serde_json::Error),
}

impl GitHubError {
    /// Status code for HTTP failures
    pub fn status(&self) -> Option<u16> {
        match self {
            GitHubError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, GitHubError::Offline(_))
    }
}

impl From<reqwest::Error> for GitHubError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            GitHubError::Offline(err.to_string())
        } else {
            GitHubError::Request(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, GitHubError>;

/// Total starred repositories, or `N/A` when it couldn't be worked out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StarredCount {
    Count(u64),
    Unavailable,
}

impl std::fmt::Display for StarredCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StarredCount::Count(n) => write!(f, "{}", n),
            StarredCount::Unavailable => write!(f, "N/A"),
        }
    }
}

/// Client for the public (unauthenticated) users API
pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
    cache: Option<Arc<CacheManager>>,
    ttl: Duration,
    repos_per_page: u32,
    starred_per_page: u32,
}

impl GitHubClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(GITHUB_API_BASE.to_string())
    }

    /// Point the client somewhere else (GitHub Enterprise, test servers)
    pub fn with_base_url(base_url: String) -> Result<Self> {
        // GitHub rejects requests without a User-Agent
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: None,
            ttl: Duration::minutes(DEFAULT_TTL_MINUTES),
            repos_per_page: REPOS_PER_PAGE,
            starred_per_page: STARRED_PER_PAGE,
        })
    }

    pub fn with_cache(mut self, cache: Arc<CacheManager>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_page_sizes(mut self, repos_per_page: u32, starred_per_page: u32) -> Self {
        self.repos_per_page = repos_per_page.max(1);
        self.starred_per_page = starred_per_page.max(1);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Account metadata for `handle`
    pub async fn fetch_account(&self, handle: &str) -> Result<GitHubUser> {
        let url = format!("{}/{}", self.base_url, handle);
        let data = self.fetch_with_cache(&url).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Every public repository of `handle`, following `rel="next"` links
    ///
    /// The assembled list is cached as a whole under the bare repos URL,
    /// so a fresh entry skips the traversal entirely.
    pub async fn fetch_repositories(&self, handle: &str) -> Result<Vec<GitHubRepo>> {
        let repos_url = format!("{}/{}/repos", self.base_url, handle);
        let key = CacheManager::key_for_url(&repos_url);

        if let Some(repos) = self.fresh::<Vec<GitHubRepo>>(&key) {
            debug!("Cache hit for {} ({} repositories)", repos_url, repos.len());
            return Ok(repos);
        }

        let mut repos = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(format!("{}?page=1&per_page={}", repos_url, self.repos_per_page));

        while let Some(url) = next {
            info!("Fetching {}", url);
            let response = self.get(&url).await?;
            visited.insert(url.clone());

            // A next link back to a fetched page would loop forever
            next = match link::find(response.headers(), "next") {
                Some(repeat) if visited.contains(&repeat) => {
                    warn!("Stopping at repeated next link {}", repeat);
                    None
                }
                other => other,
            };

            let body = response.bytes().await?;
            let mut page: Vec<GitHubRepo> = serde_json::from_slice(&body)?;
            debug!("Got {} repositories from {}", page.len(), url);
            repos.append(&mut page);
        }

        self.store(&key, &repos);
        Ok(repos)
    }

    /// Number of repositories `handle` has starred
    ///
    /// Only connectivity failures are returned as errors. Anything else
    /// (bad status, odd body) degrades to `N/A`.
    pub async fn fetch_starred_count(&self, handle: &str) -> Result<StarredCount> {
        let url = format!(
            "{}/{}/starred?per_page={}",
            self.base_url, handle, self.starred_per_page
        );

        info!("Fetching {}", url);
        let response = match self.get(&url).await {
            Ok(response) => response,
            Err(e) if e.is_offline() => return Err(e),
            Err(e) => {
                warn!("Starred count unavailable for {}: {}", handle, e);
                return Ok(StarredCount::Unavailable);
            }
        };

        let last = link::find(response.headers(), "last")
            .and_then(|url| link::page_number(&url).map(|page| (url, page)));

        let first_page_len = match self.count_items(response).await {
            Ok(len) => len,
            Err(e) if e.is_offline() => return Err(e),
            Err(e) => {
                warn!("Starred count unavailable for {}: {}", handle, e);
                return Ok(StarredCount::Unavailable);
            }
        };

        let (last_url, last_page) = match last {
            Some((url, page)) if page > 1 => (url, page),
            _ => return Ok(StarredCount::Count(first_page_len)),
        };

        // Only the last page can be short, so its length completes the total
        let last_page_len = match self.get(&last_url).await {
            Ok(response) => self.count_items(response).await,
            Err(e) => Err(e),
        };

        match last_page_len {
            Ok(len) => {
                let full_pages = u64::from(last_page - 1) * u64::from(self.starred_per_page);
                Ok(StarredCount::Count(full_pages + len))
            }
            Err(e) if e.is_offline() => Err(e),
            Err(e) => {
                warn!("Starred count unavailable for {}: {}", handle, e);
                Ok(StarredCount::Unavailable)
            }
        }
    }

    /// Language names from a repository's `languages_url`, largest first
    pub async fn fetch_languages(&self, languages_url: &str) -> Result<Vec<String>> {
        let data = self.fetch_with_cache(languages_url).await?;
        let bytes_by_language: HashMap<String, u64> = serde_json::from_value(data)?;

        let mut languages: Vec<(String, u64)> = bytes_by_language.into_iter().collect();
        languages.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Ok(languages.into_iter().map(|(name, _)| name).collect())
    }

    /// GET `url` as JSON, serving a fresh cache entry when there is one
    pub async fn fetch_with_cache(&self, url: &str) -> Result<serde_json::Value> {
        let key = CacheManager::key_for_url(url);

        if let Some(data) = self.fresh::<serde_json::Value>(&key) {
            debug!("Cache hit for {}", url);
            return Ok(data);
        }

        info!("Fetching {}", url);
        let response = self.get(url).await?;
        let body = response.bytes().await?;
        let data: serde_json::Value = serde_json::from_slice(&body)?;

        self.store(&key, &data);
        Ok(data)
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GitHubError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }

    async fn count_items(&self, response: reqwest::Response) -> Result<u64> {
        let body = response.bytes().await?;
        let items: Vec<serde_json::Value> = serde_json::from_slice(&body)?;
        Ok(items.len() as u64)
    }

    fn fresh<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = self.cache.as_ref()?.get::<T>(key)?;
        if entry.is_valid(self.ttl) {
            Some(entry.data)
        } else {
            debug!("Cache entry {} is stale", key);
            None
        }
    }

    fn store<T: Serialize>(&self, key: &str, data: &T) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(key, data) {
                debug!("Failed to cache {}: {}", key, e);
            }
        }
    }
}

/// `GET /users/{handle}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: String,
    pub html_url: String,
    pub bio: Option<String>,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub following: u32,
    #[serde(default)]
    pub public_repos: u32,
}

/// One element of `GET /users/{handle}/repos`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub name: String,
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub forks_count: u32,
    pub updated_at: DateTime<Utc>,
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub parent: Option<GitHubParent>,
    #[serde(default)]
    pub languages_url: Option<String>,
}

/// The upstream of a fork; only present on single-repository responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubParent {
    pub language: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starred_count_display() {
        assert_eq!(StarredCount::Count(107).to_string(), "107");
        assert_eq!(StarredCount::Unavailable.to_string(), "N/A");
    }

    #[test]
    fn test_error_classification() {
        let err = GitHubError::Status {
            status: 404,
            url: "https://api.github.com/users/ghost".into(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_offline());
        assert_eq!(err.status(), Some(404));

        let err = GitHubError::Offline("dns".into());
        assert!(err.is_offline());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_repo_deserializes_with_missing_optionals() {
        let json = r#"{
            "name": "anx-cli",
            "description": null,
            "html_url": "https://github.com/a/anx-cli",
            "stargazers_count": 3,
            "forks_count": 1,
            "updated_at": "2024-05-01T12:00:00Z",
            "language": null
        }"#;
        let repo: GitHubRepo = serde_json::from_str(json).unwrap();
        assert!(repo.topics.is_empty());
        assert!(!repo.fork);
        assert!(repo.parent.is_none());
        assert!(repo.languages_url.is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = GitHubClient::with_base_url("http://localhost:1/users/".into()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:1/users");
    }
}
