// Pure view derivation: repositories in, display-ready cards out
use crate::collection::{RepositoryCollection, ViewState};
use crate::models::Repository;
use crate::theme::Color;

pub const NO_REPOSITORIES_MESSAGE: &str = "No public repositories found.";
pub const NO_MATCHES_MESSAGE: &str = "No repositories found matching your search.";
pub const UNKNOWN_LANGUAGE: &str = "Unknown";
pub const NO_DESCRIPTION: &str = "No description";

/// Cards show at most this many enrichment languages
const MAX_CARD_LANGUAGES: usize = 5;

const DEFAULT_LANGUAGE_COLOR: Color = Color::rgb(0x3a5ccc);

/// What a fork without a language of its own should display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LanguageDisplayPolicy {
    OwnOnly,
    #[default]
    InheritFromParent,
}

impl LanguageDisplayPolicy {
    pub fn from_inherit_flag(inherit: bool) -> Self {
        if inherit {
            LanguageDisplayPolicy::InheritFromParent
        } else {
            LanguageDisplayPolicy::OwnOnly
        }
    }
}

/// Everything one gallery card needs
#[derive(Debug, Clone, PartialEq)]
pub struct RepoCard {
    pub name: String,
    pub description: String,
    pub url: String,
    pub stars: u32,
    pub forks: u32,
    pub language: String,
    pub language_color: Color,
    pub updated: String,
    pub is_fork: bool,
    pub languages: Vec<String>,
}

/// Pagination bar, absent when everything fits on one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    pub current: usize,
    pub total: usize,
    pub label: String,
    pub has_previous: bool,
    pub has_next: bool,
}

pub fn render_cards(page: &[&Repository], policy: LanguageDisplayPolicy) -> Vec<RepoCard> {
    page.iter().map(|repo| render_card(repo, policy)).collect()
}

pub fn render_card(repo: &Repository, policy: LanguageDisplayPolicy) -> RepoCard {
    let language = display_language(repo, policy).unwrap_or(UNKNOWN_LANGUAGE);

    RepoCard {
        name: repo.name.clone(),
        description: repo
            .description
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        url: repo.url.clone(),
        stars: repo.stars,
        forks: repo.forks,
        language: language.to_string(),
        language_color: language_color(language),
        updated: repo.updated_at.format("%Y-%m-%d").to_string(),
        is_fork: repo.is_fork,
        languages: repo
            .languages
            .iter()
            .take(MAX_CARD_LANGUAGES)
            .cloned()
            .collect(),
    }
}

pub fn display_language(repo: &Repository, policy: LanguageDisplayPolicy) -> Option<&str> {
    if let Some(lang) = repo.language.as_deref() {
        return Some(lang);
    }

    match policy {
        LanguageDisplayPolicy::InheritFromParent if repo.is_fork => {
            repo.parent_language.as_deref()
        }
        _ => None,
    }
}

/// GitHub's linguist colours for the common languages
pub fn language_color(language: &str) -> Color {
    match language {
        "JavaScript" => Color::rgb(0xf1e05a),
        "Python" => Color::rgb(0x3572a5),
        "Java" => Color::rgb(0xb07219),
        "TypeScript" => Color::rgb(0x3178c6),
        "PHP" => Color::rgb(0x4f5d95),
        "Ruby" => Color::rgb(0x701516),
        "C++" => Color::rgb(0xf34b7d),
        "C#" => Color::rgb(0x178600),
        "Swift" => Color::rgb(0xffac45),
        "Kotlin" => Color::rgb(0xa97bff),
        "Go" => Color::rgb(0x00add8),
        "Rust" => Color::rgb(0xdea584),
        "HTML" => Color::rgb(0xe34c26),
        "CSS" => Color::rgb(0x563d7c),
        "SCSS" => Color::rgb(0xc6538c),
        "Shell" => Color::rgb(0x89e051),
        "Jupyter Notebook" => Color::rgb(0xda5b0b),
        _ => DEFAULT_LANGUAGE_COLOR,
    }
}

pub fn render_pagination(collection: &RepositoryCollection) -> Option<PaginationView> {
    let total = collection.page_count();
    if total <= 1 {
        return None;
    }

    let current = collection.current_page();
    Some(PaginationView {
        current,
        total,
        label: format!("Page {} of {}", current, total),
        has_previous: current > 1,
        has_next: current < total,
    })
}

/// Message to show in place of cards, if any
pub fn empty_message(state: ViewState) -> Option<&'static str> {
    match state {
        ViewState::Empty => Some(NO_REPOSITORIES_MESSAGE),
        ViewState::NoMatches => Some(NO_MATCHES_MESSAGE),
        ViewState::Showing => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::PageSizing;
    use crate::models::fixtures::repo;

    #[test]
    fn test_card_fields() {
        let mut r = repo("anx-cli", 12, Some("Rust"));
        r.forks = 3;
        r.description = Some("A CLI tool".to_string());
        r.languages = ["Rust", "Shell", "Python", "C", "Go", "Nix"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let card = render_card(&r, LanguageDisplayPolicy::default());
        assert_eq!(card.name, "anx-cli");
        assert_eq!(card.description, "A CLI tool");
        assert_eq!(card.stars, 12);
        assert_eq!(card.forks, 3);
        assert_eq!(card.language, "Rust");
        assert_eq!(card.language_color.to_hex(), "#dea584");
        assert_eq!(card.updated, "2024-01-01");
        assert_eq!(card.languages.len(), 5);
        assert!(!card.is_fork);
    }

    #[test]
    fn test_missing_description_and_language() {
        let card = render_card(&repo("bare", 0, None), LanguageDisplayPolicy::OwnOnly);
        assert_eq!(card.description, NO_DESCRIPTION);
        assert_eq!(card.language, UNKNOWN_LANGUAGE);
        assert_eq!(card.language_color.to_hex(), "#3a5ccc");
    }

    #[test]
    fn test_fork_language_policy() {
        let mut fork = repo("fork", 0, None);
        fork.is_fork = true;
        fork.parent_language = Some("Go".to_string());

        assert_eq!(
            display_language(&fork, LanguageDisplayPolicy::InheritFromParent),
            Some("Go")
        );
        assert_eq!(display_language(&fork, LanguageDisplayPolicy::OwnOnly), None);

        // Non-forks never borrow a parent language
        let mut not_fork = fork.clone();
        not_fork.is_fork = false;
        assert_eq!(
            display_language(&not_fork, LanguageDisplayPolicy::InheritFromParent),
            None
        );
    }

    #[test]
    fn test_pagination_hidden_for_single_page() {
        let mut c = RepositoryCollection::new(PageSizing::fixed(24));
        c.initialize(vec![repo("a", 1, None)], 120);
        assert!(render_pagination(&c).is_none());
    }

    #[test]
    fn test_pagination_view() {
        let mut c = RepositoryCollection::new(PageSizing::fixed(2));
        c.initialize(
            (0..5).map(|i| repo(&format!("r{}", i), i, None)).collect(),
            120,
        );
        c.set_page(2);

        let view = render_pagination(&c).unwrap();
        assert_eq!(view.label, "Page 2 of 3");
        assert!(view.has_previous);
        assert!(view.has_next);

        c.set_page(3);
        let view = render_pagination(&c).unwrap();
        assert!(!view.has_next);
    }

    #[test]
    fn test_empty_messages_differ() {
        assert_eq!(empty_message(ViewState::Empty), Some(NO_REPOSITORIES_MESSAGE));
        assert_eq!(empty_message(ViewState::NoMatches), Some(NO_MATCHES_MESSAGE));
        assert_eq!(empty_message(ViewState::Showing), None);
    }
}
