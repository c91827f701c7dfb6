// Repository gallery state: search, language facets, sort order, paging
use std::collections::{BTreeSet, HashSet};

use crate::models::{Repository, SortKey};

/// How many cards fit on a page, depending on terminal width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSizing {
    /// Widths up to and including this many columns count as narrow
    pub narrow_width: u16,
    pub narrow: usize,
    pub wide: usize,
}

impl PageSizing {
    /// Same page size at every width
    pub fn fixed(size: usize) -> Self {
        Self {
            narrow_width: 0,
            narrow: size,
            wide: size,
        }
    }

    pub fn page_size_for(&self, width: u16) -> usize {
        let size = if width <= self.narrow_width {
            self.narrow
        } else {
            self.wide
        };
        size.max(1)
    }
}

impl Default for PageSizing {
    fn default() -> Self {
        Self {
            narrow_width: 100,
            narrow: 12,
            wide: 24,
        }
    }
}

/// What the gallery should show right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// The account has no public repositories at all
    Empty,
    /// Repositories exist but none pass the current search and filters
    NoMatches,
    Showing,
}

/// Owns the full repository list and derives the visible page from it
///
/// Derivation always runs search, then language filter, then sort, then
/// pagination. Search and filter changes send the cursor back to page 1;
/// a sort change keeps the page since the filtered set is unchanged.
#[derive(Debug, Clone)]
pub struct RepositoryCollection {
    all: Vec<Repository>,
    languages: Vec<String>,
    active_languages: BTreeSet<String>,
    search_term: String,
    sort_key: SortKey,
    current_page: usize,
    page_size: usize,
    sizing: PageSizing,
    /// Indices into `all`, filtered and in display order
    filtered: Vec<usize>,
}

impl RepositoryCollection {
    pub fn new(sizing: PageSizing) -> Self {
        Self {
            all: Vec::new(),
            languages: Vec::new(),
            active_languages: BTreeSet::new(),
            search_term: String::new(),
            sort_key: SortKey::default(),
            current_page: 1,
            page_size: sizing.page_size_for(u16::MAX),
            sizing,
            filtered: Vec::new(),
        }
    }

    /// Load the repository list and reset every filter
    ///
    /// The stored order is by stars, most first, whatever the sort key
    /// later becomes.
    pub fn initialize(&mut self, mut repositories: Vec<Repository>, viewport_width: u16) {
        repositories.sort_by(|a, b| SortKey::Stars.compare(a, b));

        let mut seen = HashSet::new();
        repositories.retain(|repo| seen.insert(repo.name.clone()));

        let languages: BTreeSet<String> = repositories
            .iter()
            .filter_map(|repo| repo.language.clone())
            .filter(|lang| !lang.is_empty())
            .collect();

        self.all = repositories;
        self.languages = languages.into_iter().collect();
        self.active_languages.clear();
        self.search_term.clear();
        self.sort_key = SortKey::default();
        self.page_size = self.sizing.page_size_for(viewport_width);
        self.refilter();
    }

    pub fn set_search_term(&mut self, term: &str) {
        self.search_term = term.to_lowercase();
        self.refilter();
    }

    /// Flip one language facet on or off
    ///
    /// Turning off the last active facet is the same as choosing "All".
    pub fn toggle_language_filter(&mut self, language: &str) {
        if !self.active_languages.remove(language) {
            self.active_languages.insert(language.to_string());
        }
        self.refilter();
    }

    /// The "All" tag: clear every language facet
    pub fn select_all_languages(&mut self) {
        self.active_languages.clear();
        self.refilter();
    }

    pub fn set_sort_key(&mut self, key: SortKey) {
        self.sort_key = key;
        self.sort_filtered();
        self.set_page(self.current_page);
    }

    /// Move to page `n`, clamped into range
    pub fn set_page(&mut self, n: usize) {
        self.current_page = n.clamp(1, self.page_count());
    }

    pub fn next_page(&mut self) {
        self.set_page(self.current_page + 1);
    }

    pub fn previous_page(&mut self) {
        self.set_page(self.current_page.saturating_sub(1));
    }

    pub fn visible_page(&self) -> Vec<&Repository> {
        let start = (self.current_page - 1) * self.page_size;
        self.filtered
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(|&idx| &self.all[idx])
            .collect()
    }

    /// Every repository passing search and filters, in display order
    pub fn filtered_sorted(&self) -> Vec<&Repository> {
        self.filtered.iter().map(|&idx| &self.all[idx]).collect()
    }

    /// Never below 1, so "Page 1 of 1" still makes sense for no results
    pub fn page_count(&self) -> usize {
        ((self.filtered.len() + self.page_size - 1) / self.page_size).max(1)
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered.len()
    }

    pub fn total_count(&self) -> usize {
        self.all.len()
    }

    pub fn view_state(&self) -> ViewState {
        if self.all.is_empty() {
            ViewState::Empty
        } else if self.filtered.is_empty() {
            ViewState::NoMatches
        } else {
            ViewState::Showing
        }
    }

    /// Distinct languages present, sorted, for the facet tags
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn is_language_active(&self, language: &str) -> bool {
        self.active_languages.contains(language)
    }

    pub fn active_languages(&self) -> &BTreeSet<String> {
        &self.active_languages
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    fn refilter(&mut self) {
        let term = &self.search_term;
        let active = &self.active_languages;

        self.filtered = self
            .all
            .iter()
            .enumerate()
            .filter(|(_, repo)| repo.matches_term(term))
            .filter(|(_, repo)| {
                active.is_empty()
                    || repo
                        .language
                        .as_ref()
                        .is_some_and(|lang| active.contains(lang))
            })
            .map(|(idx, _)| idx)
            .collect();

        self.sort_filtered();
        self.current_page = 1;
    }

    fn sort_filtered(&mut self) {
        let all = &self.all;
        let key = self.sort_key;
        // Stable: ties keep their previous relative order
        self.filtered.sort_by(|&a, &b| key.compare(&all[a], &all[b]));
    }
}

impl Default for RepositoryCollection {
    fn default() -> Self {
        Self::new(PageSizing::default())
    }
}
