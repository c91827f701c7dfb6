use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::collection::PageSizing;
use crate::render::LanguageDisplayPolicy;

/// Main configuration structure
///
/// Loaded from `config.toml` in the platform config dir. Missing file or
/// missing fields fall back to defaults; CLI flags override on top.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Load config from default location, or defaults if there is none
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Self::from_toml(&contents)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(contents: &str) -> crate::Result<Self> {
        toml::from_str(contents)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save config to disk
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&config_path, contents)?;
        Ok(())
    }

    /// XDG on Linux, Application Support on macOS, AppData on Windows
    pub fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::Config("Could not find config directory".into()))?
            .join("gitfolio");

        Ok(config_dir.join("config.toml"))
    }

    /// Where the response cache lives
    pub fn cache_path(&self) -> crate::Result<PathBuf> {
        if let Some(path) = &self.cache.path {
            return Ok(path.clone());
        }

        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| crate::Error::Config("Could not find cache directory".into()))?
            .join("gitfolio");

        Ok(cache_dir.join("cache.db"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// API URL (for GitHub Enterprise)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Whose profile to show when no handle is given
    #[serde(default = "default_handle")]
    pub default_handle: String,

    #[serde(default = "default_repos_per_page")]
    pub repos_per_page: u32,

    #[serde(default = "default_starred_per_page")]
    pub starred_per_page: u32,

    /// Look up every repository's full language breakdown
    #[serde(default)]
    pub enrich_languages: bool,

    /// Max language lookups in flight during enrichment
    #[serde(default = "default_enrich_concurrency")]
    pub enrich_concurrency: usize,
}

fn default_api_url() -> String {
    gitfolio_api::GITHUB_API_BASE.to_string()
}

fn default_handle() -> String {
    "anxety-solo".to_string()
}

fn default_repos_per_page() -> u32 {
    gitfolio_api::REPOS_PER_PAGE
}

fn default_starred_per_page() -> u32 {
    gitfolio_api::STARRED_PER_PAGE
}

fn default_enrich_concurrency() -> usize {
    8
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            default_handle: default_handle(),
            repos_per_page: default_repos_per_page(),
            starred_per_page: default_starred_per_page(),
            enrich_languages: false,
            enrich_concurrency: default_enrich_concurrency(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long a cached response stays fresh
    #[serde(default = "default_cache_ttl")]
    pub ttl_minutes: u64,

    /// Override for the cache database location
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_cache_ttl() -> u64 {
    15
}

impl CacheConfig {
    /// Saturates instead of wrapping for absurd values
    pub fn ttl(&self) -> chrono::Duration {
        i64::try_from(self.ttl_minutes)
            .ok()
            .and_then(chrono::Duration::try_minutes)
            .unwrap_or(chrono::Duration::MAX)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_cache_ttl(),
            path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Terminals this many columns wide or narrower get the small page size
    #[serde(default = "default_narrow_width")]
    pub narrow_width: u16,

    #[serde(default = "default_page_size_narrow")]
    pub page_size_narrow: usize,

    #[serde(default = "default_page_size_wide")]
    pub page_size_wide: usize,

    /// Quiet period after the last keystroke before search runs
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Show a fork's upstream language when it has none of its own
    #[serde(default = "default_inherit_fork_language")]
    pub inherit_fork_language: bool,
}

fn default_narrow_width() -> u16 {
    100
}

fn default_page_size_narrow() -> usize {
    12
}

fn default_page_size_wide() -> usize {
    24
}

fn default_debounce_ms() -> u64 {
    450
}

fn default_inherit_fork_language() -> bool {
    true
}

impl UiConfig {
    pub fn page_sizing(&self) -> PageSizing {
        PageSizing {
            narrow_width: self.narrow_width,
            narrow: self.page_size_narrow,
            wide: self.page_size_wide,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn language_policy(&self) -> LanguageDisplayPolicy {
        LanguageDisplayPolicy::from_inherit_flag(self.inherit_fork_language)
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            narrow_width: default_narrow_width(),
            page_size_narrow: default_page_size_narrow(),
            page_size_wide: default_page_size_wide(),
            debounce_ms: default_debounce_ms(),
            inherit_fork_language: default_inherit_fork_language(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cache.ttl_minutes, 15);
        assert_eq!(config.cache.ttl().num_milliseconds(), 900_000);
        assert_eq!(config.github.api_url, "https://api.github.com/users");
        assert_eq!(config.github.starred_per_page, 50);
        assert_eq!(config.ui.page_sizing().page_size_for(80), 12);
        assert_eq!(config.ui.page_sizing().page_size_for(200), 24);
        assert_eq!(config.ui.language_policy(), LanguageDisplayPolicy::InheritFromParent);
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let cache = CacheConfig {
            ttl_minutes: u64::MAX,
            ..CacheConfig::default()
        };
        assert_eq!(cache.ttl(), chrono::Duration::MAX);
        assert!(cache.ttl() > chrono::Duration::weeks(52 * 100));

        let cache = CacheConfig {
            ttl_minutes: i64::MAX as u64,
            ..CacheConfig::default()
        };
        assert_eq!(cache.ttl(), chrono::Duration::MAX);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [github]
            default_handle = "octocat"

            [ui]
            debounce_ms = 200
            inherit_fork_language = false
            "#,
        )
        .unwrap();

        assert_eq!(config.github.default_handle, "octocat");
        assert_eq!(config.github.repos_per_page, 100);
        assert_eq!(config.ui.debounce(), Duration::from_millis(200));
        assert_eq!(config.ui.language_policy(), LanguageDisplayPolicy::OwnOnly);
        assert_eq!(config.cache.ttl_minutes, 15);
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = Config::from_toml("[github\nnope").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("ttl_minutes"));
        assert!(toml.contains("default_handle"));
    }

    #[test]
    fn test_explicit_cache_path() {
        let mut config = Config::default();
        config.cache.path = Some(PathBuf::from("/tmp/gitfolio-test.db"));
        assert_eq!(
            config.cache_path().unwrap(),
            PathBuf::from("/tmp/gitfolio-test.db")
        );
    }
}
