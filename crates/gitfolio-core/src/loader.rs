// Initial profile load: three concurrent fetches, all or nothing
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use gitfolio_api::StarredCount;
use tracing::{info, warn};

use crate::models::{Account, Repository};
use crate::Result;

/// Where profile data comes from
///
/// The GitHub provider is the real one; tests swap in mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_account(&self, handle: &str) -> Result<Account>;
    async fn fetch_repositories(&self, handle: &str) -> Result<Vec<Repository>>;
    async fn fetch_starred_count(&self, handle: &str) -> Result<StarredCount>;
    async fn fetch_languages(&self, languages_url: &str) -> Result<Vec<String>>;
}

#[derive(Debug, Clone)]
pub struct LoadedProfile {
    pub account: Account,
    pub repositories: Vec<Repository>,
    pub starred: StarredCount,
}

/// Fetch account, repositories and starred count concurrently
///
/// Any one failing fails the whole load; there is no partial profile.
pub async fn load_profile(source: &dyn ProfileSource, handle: &str) -> Result<LoadedProfile> {
    info!("Loading profile for {}", handle);

    let (account, repositories, starred) = tokio::try_join!(
        source.fetch_account(handle),
        source.fetch_repositories(handle),
        source.fetch_starred_count(handle),
    )?;

    info!(
        "Loaded {} repositories for {} (starred: {})",
        repositories.len(),
        account.login,
        starred
    );

    Ok(LoadedProfile {
        account,
        repositories,
        starred,
    })
}

/// Fill `languages` for each repository with at most `concurrency`
/// lookups in flight. Failed lookups leave the list empty.
pub async fn enrich_languages(
    source: &dyn ProfileSource,
    repositories: &mut [Repository],
    concurrency: usize,
) {
    let urls: Vec<Option<String>> = repositories
        .iter()
        .map(|repo| repo.languages_url.clone())
        .collect();

    let results: Vec<Vec<String>> = stream::iter(urls)
        .map(|url| async move {
            let Some(url) = url else {
                return Vec::new();
            };
            match source.fetch_languages(&url).await {
                Ok(languages) => languages,
                Err(e) => {
                    warn!("Language lookup failed for {}: {}", url, e);
                    Vec::new()
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    for (repo, languages) in repositories.iter_mut().zip(results) {
        repo.languages = languages;
    }
}
