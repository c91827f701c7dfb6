use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// A public repository as shown in the gallery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub description: Option<String>,
    pub url: String,
    pub stars: u32,
    pub forks: u32,
    pub updated_at: DateTime<Utc>,
    pub language: Option<String>,
    pub topics: Vec<String>,
    pub is_fork: bool,
    /// Primary language of the upstream, forks only
    pub parent_language: Option<String>,
    pub languages_url: Option<String>,
    /// Filled in by language enrichment, empty otherwise
    pub languages: Vec<String>,
}

impl Repository {
    /// Case-insensitive substring match on name, description or any topic.
    /// `term` must already be lower-cased.
    pub fn matches_term(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }

        self.name.to_lowercase().contains(term)
            || self
                .description
                .as_ref()
                .is_some_and(|d| d.to_lowercase().contains(term))
            || self
                .topics
                .iter()
                .any(|topic| topic.to_lowercase().contains(term))
    }
}

/// The account whose profile is being viewed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: String,
    pub profile_url: String,
    pub bio: Option<String>,
    pub followers: u32,
    pub following: u32,
    pub public_repos: u32,
}

impl Account {
    /// `name`, or `login` when the account never set one
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.login)
    }
}

/// Gallery ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Stars,
    Forks,
    Updated,
    Name,
}

impl SortKey {
    pub fn all() -> [SortKey; 4] {
        [SortKey::Stars, SortKey::Forks, SortKey::Updated, SortKey::Name]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Stars => "stars",
            SortKey::Forks => "forks",
            SortKey::Updated => "updated",
            SortKey::Name => "name",
        }
    }

    /// Label shown in the sort dropdown
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Stars => "Most Stars",
            SortKey::Forks => "Most Forks",
            SortKey::Updated => "Recently Updated",
            SortKey::Name => "Name",
        }
    }

    /// Comparator for this key. Counts and dates sort descending, names
    /// ascending.
    pub fn compare(&self, a: &Repository, b: &Repository) -> Ordering {
        match self {
            SortKey::Stars => b.stars.cmp(&a.stars),
            SortKey::Forks => b.forks.cmp(&a.forks),
            SortKey::Updated => b.updated_at.cmp(&a.updated_at),
            SortKey::Name => compare_names(&a.name, &b.name),
        }
    }
}

/// Close enough to a locale-aware collation for repository names:
/// letters compare case-insensitively, exact case only breaks ties.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stars" => Ok(SortKey::Stars),
            "forks" => Ok(SortKey::Forks),
            "updated" => Ok(SortKey::Updated),
            "name" => Ok(SortKey::Name),
            other => Err(crate::Error::InvalidSortKey(other.to_string())),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::repo;
    use super::*;

    #[test]
    fn test_search_matches_name_description_and_topics() {
        let by_name = repo("anx-cli", 1, None);

        let mut by_description = repo("toolbox", 1, None);
        by_description.description = Some("A CLI tool".to_string());

        let mut by_topic = repo("widgets", 1, None);
        by_topic.topics = vec!["cli".to_string()];

        let mut neither = repo("website", 1, None);
        neither.description = Some("Personal homepage".to_string());
        neither.topics = vec!["html".to_string()];

        assert!(by_name.matches_term("cli"));
        assert!(by_description.matches_term("cli"));
        assert!(by_topic.matches_term("cli"));
        assert!(!neither.matches_term("cli"));
    }

    #[test]
    fn test_empty_term_matches_everything() {
        assert!(repo("anything", 0, None).matches_term(""));
    }

    #[test]
    fn test_display_name_falls_back_to_login() {
        let mut account = Account {
            login: "octocat".into(),
            name: None,
            avatar_url: String::new(),
            profile_url: String::new(),
            bio: None,
            followers: 0,
            following: 0,
            public_repos: 0,
        };
        assert_eq!(account.display_name(), "octocat");

        account.name = Some("The Octocat".into());
        assert_eq!(account.display_name(), "The Octocat");
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("stars".parse::<SortKey>().unwrap(), SortKey::Stars);
        assert_eq!("Updated".parse::<SortKey>().unwrap(), SortKey::Updated);
        assert!("popularity".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_name_comparison_ignores_case_first() {
        let mut names = vec!["beta", "Alpha", "alpha", "Gamma"];
        names.sort_by(|a, b| compare_names(a, b));
        assert_eq!(names, vec!["Alpha", "alpha", "beta", "Gamma"]);
    }
}
