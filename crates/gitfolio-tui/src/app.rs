// TUI application state and event handling
use std::time::{Duration, Instant};

use gitfolio_core::{
    render::{self, LanguageDisplayPolicy, PaginationView, RepoCard},
    Debouncer, Error, ErrorPage, LoadedProfile, PageSizing, ProfileCard, Repository,
    RepositoryCollection, SortKey, Theme, ThemePreference, ViewState,
};

/// How long the "viewing @someone" popup stays up
pub const USER_POPUP_DURATION: Duration = Duration::from_secs(5);

/// Label of the pseudo-tag that clears every language filter
pub const ALL_LANGUAGES: &str = "All";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,    // Navigating cards
    Searching, // Typing in the search box
    Languages, // Moving along the language tag bar
    SortMenu,  // Sort dropdown is open
    Help,      // Keybindings overlay
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Gallery,
    Error(ErrorPage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub message: String,
    pub expires_at: Instant,
}

pub struct App {
    pub should_quit: bool,
    pub reload_requested: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub search_input: String,
    pub search_debounce: Debouncer<String>,
    pub collection: RepositoryCollection,
    pub profile: Option<ProfileCard>,
    pub policy: LanguageDisplayPolicy,
    /// Index into the visible page
    pub selected_index: usize,
    /// 0 is the "All" tag, then one per language facet
    pub language_cursor: usize,
    pub sort_cursor: usize,
    pub theme_preference: ThemePreference,
    pub theme: Theme,
    pub popup: Option<Popup>,
    /// Flash "Viewing @login" after each successful load
    pub announce_user: bool,
    pub status_message: Option<String>,
}

impl App {
    pub fn new(
        sizing: PageSizing,
        policy: LanguageDisplayPolicy,
        debounce: Duration,
        theme_preference: ThemePreference,
    ) -> Self {
        Self {
            should_quit: false,
            reload_requested: false,
            screen: Screen::Loading,
            input_mode: InputMode::Normal,
            search_input: String::new(),
            search_debounce: Debouncer::new(debounce),
            collection: RepositoryCollection::new(sizing),
            profile: None,
            policy,
            selected_index: 0,
            language_cursor: 0,
            sort_cursor: 0,
            theme: theme_preference.theme(),
            theme_preference,
            popup: None,
            announce_user: false,
            status_message: None,
        }
    }

    /// Swap in freshly loaded data; everything filter-related starts over
    pub fn load(&mut self, profile: LoadedProfile, viewport_width: u16) {
        self.profile = Some(ProfileCard::from_account(&profile.account, profile.starred));
        self.collection.initialize(profile.repositories, viewport_width);
        self.search_input.clear();
        self.search_debounce.cancel();
        self.selected_index = 0;
        self.language_cursor = 0;
        self.sort_cursor = 0;
        self.input_mode = InputMode::Normal;
        self.screen = Screen::Gallery;
        if self.announce_user {
            self.show_user_popup(&profile.account.login, Instant::now());
        }
    }

    pub fn fail(&mut self, err: &Error) {
        self.screen = Screen::Error(ErrorPage::new(err));
        self.input_mode = InputMode::Normal;
    }

    /// Retry is a full reload, same as refreshing the page
    pub fn request_reload(&mut self) {
        self.reload_requested = true;
        self.screen = Screen::Loading;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Advance timers: debounced search and popup expiry
    pub fn tick(&mut self, now: Instant) {
        if let Some(term) = self.search_debounce.take_due(now) {
            self.apply_search(&term);
        }

        if self.popup.as_ref().is_some_and(|p| p.expires_at <= now) {
            self.popup = None;
        }
    }

    /// Longest the event loop may block before `tick` has work to do
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        let popup = self
            .popup
            .as_ref()
            .map(|p| p.expires_at.saturating_duration_since(now));

        match (self.search_debounce.time_until_due(now), popup) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn show_user_popup(&mut self, login: &str, now: Instant) {
        self.popup = Some(Popup {
            message: format!("Viewing @{}", login),
            expires_at: now + USER_POPUP_DURATION,
        });
    }

    // Search box

    pub fn enter_search_mode(&mut self) {
        self.input_mode = InputMode::Searching;
    }

    pub fn enter_normal_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn push_search_char(&mut self, c: char, now: Instant) {
        self.search_input.push(c);
        self.search_debounce.schedule(self.search_input.clone(), now);
    }

    pub fn pop_search_char(&mut self, now: Instant) {
        self.search_input.pop();
        self.search_debounce.schedule(self.search_input.clone(), now);
    }

    /// Enter in the search box: skip the wait
    pub fn commit_search(&mut self) {
        self.search_debounce.cancel();
        let term = self.search_input.clone();
        self.apply_search(&term);
        self.enter_normal_mode();
    }

    pub fn clear_search(&mut self) {
        self.search_input.clear();
        self.commit_search();
    }

    fn apply_search(&mut self, term: &str) {
        self.collection.set_search_term(term);
        self.selected_index = 0;
    }

    // Language tags

    pub fn enter_language_mode(&mut self) {
        self.input_mode = InputMode::Languages;
    }

    /// "All" followed by every language facet
    pub fn language_tags(&self) -> Vec<&str> {
        std::iter::once(ALL_LANGUAGES)
            .chain(self.collection.languages().iter().map(String::as_str))
            .collect()
    }

    pub fn is_tag_active(&self, index: usize) -> bool {
        match index {
            0 => self.collection.active_languages().is_empty(),
            i => self
                .collection
                .languages()
                .get(i - 1)
                .is_some_and(|lang| self.collection.is_language_active(lang)),
        }
    }

    pub fn next_language(&mut self) {
        let last = self.collection.languages().len();
        self.language_cursor = (self.language_cursor + 1).min(last);
    }

    pub fn previous_language(&mut self) {
        self.language_cursor = self.language_cursor.saturating_sub(1);
    }

    pub fn toggle_language_at_cursor(&mut self) {
        if self.language_cursor == 0 {
            self.collection.select_all_languages();
        } else if let Some(lang) = self.collection.languages().get(self.language_cursor - 1) {
            let lang = lang.clone();
            self.collection.toggle_language_filter(&lang);
        }
        self.selected_index = 0;
    }

    // Sort dropdown

    pub fn open_sort_menu(&mut self) {
        let current = self.collection.sort_key();
        self.sort_cursor = SortKey::all()
            .iter()
            .position(|k| *k == current)
            .unwrap_or(0);
        self.input_mode = InputMode::SortMenu;
    }

    pub fn next_sort_option(&mut self) {
        self.sort_cursor = (self.sort_cursor + 1).min(SortKey::all().len() - 1);
    }

    pub fn previous_sort_option(&mut self) {
        self.sort_cursor = self.sort_cursor.saturating_sub(1);
    }

    pub fn choose_sort_option(&mut self) {
        if let Some(key) = SortKey::all().get(self.sort_cursor) {
            self.collection.set_sort_key(*key);
        }
        self.selected_index = 0;
        self.enter_normal_mode();
    }

    // Pagination and selection

    pub fn next_page(&mut self) {
        self.collection.next_page();
        self.selected_index = 0;
    }

    pub fn previous_page(&mut self) {
        self.collection.previous_page();
        self.selected_index = 0;
    }

    pub fn next_card(&mut self) {
        let len = self.collection.visible_page().len();
        if len > 0 {
            self.selected_index = (self.selected_index + 1).min(len - 1);
        }
    }

    pub fn previous_card(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn selected_repository(&self) -> Option<&Repository> {
        self.collection.visible_page().get(self.selected_index).copied()
    }

    // Theme

    pub fn toggle_theme(&mut self) -> ThemePreference {
        self.theme_preference = self.theme_preference.toggled();
        self.theme = self.theme_preference.theme();
        self.theme_preference
    }

    // Derived view

    pub fn cards(&self) -> Vec<RepoCard> {
        render::render_cards(&self.collection.visible_page(), self.policy)
    }

    pub fn pagination(&self) -> Option<PaginationView> {
        render::render_pagination(&self.collection)
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        render::empty_message(self.collection.view_state())
    }

    pub fn view_state(&self) -> ViewState {
        self.collection.view_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use gitfolio_core::{Account, StarredCount};

    fn repo(name: &str, stars: u32, language: Option<&str>) -> Repository {
        Repository {
            name: name.to_string(),
            description: None,
            url: format!("https://github.com/octocat/{}", name),
            stars,
            forks: 0,
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            language: language.map(str::to_string),
            topics: Vec::new(),
            is_fork: false,
            parent_language: None,
            languages_url: None,
            languages: Vec::new(),
        }
    }

    fn loaded(repositories: Vec<Repository>) -> LoadedProfile {
        LoadedProfile {
            account: Account {
                login: "octocat".into(),
                name: None,
                avatar_url: String::new(),
                profile_url: "https://github.com/octocat".into(),
                bio: None,
                followers: 0,
                following: 0,
                public_repos: repositories.len() as u32,
            },
            repositories,
            starred: StarredCount::Count(3),
        }
    }

    fn app_with(repositories: Vec<Repository>) -> App {
        let mut app = App::new(
            PageSizing::fixed(2),
            LanguageDisplayPolicy::default(),
            Duration::from_millis(450),
            ThemePreference::Dark,
        );
        app.load(loaded(repositories), 120);
        app
    }

    fn sample() -> Vec<Repository> {
        vec![
            repo("anx-cli", 9, Some("Rust")),
            repo("site", 5, Some("HTML")),
            repo("dots", 3, None),
            repo("tool", 1, Some("Rust")),
        ]
    }

    #[test]
    fn test_load_switches_to_gallery() {
        let app = app_with(sample());
        assert_eq!(app.screen, Screen::Gallery);
        assert_eq!(app.profile.as_ref().unwrap().display_name, "octocat");
        assert_eq!(app.cards().len(), 2);
        assert_eq!(app.pagination().unwrap().label, "Page 1 of 2");
    }

    #[test]
    fn test_typing_is_debounced() {
        let mut app = app_with(sample());
        let start = Instant::now();

        app.enter_search_mode();
        app.push_search_char('c', start);
        app.push_search_char('l', start + Duration::from_millis(100));
        app.push_search_char('i', start + Duration::from_millis(200));

        app.tick(start + Duration::from_millis(500));
        assert_eq!(app.collection.filtered_count(), 4, "search ran too early");

        app.tick(start + Duration::from_millis(650));
        assert_eq!(app.collection.search_term(), "cli");
        assert_eq!(app.collection.filtered_count(), 1);
    }

    #[test]
    fn test_commit_search_applies_immediately() {
        let mut app = app_with(sample());
        let now = Instant::now();
        app.push_search_char('s', now);
        app.push_search_char('i', now);
        app.commit_search();

        assert!(!app.search_debounce.is_pending());
        assert_eq!(app.collection.filtered_count(), 1);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_language_tags_and_toggle() {
        let mut app = app_with(sample());
        assert_eq!(app.language_tags(), vec!["All", "HTML", "Rust"]);
        assert!(app.is_tag_active(0));

        app.next_language();
        app.next_language();
        app.toggle_language_at_cursor();
        assert!(app.is_tag_active(2));
        assert!(!app.is_tag_active(0));
        assert_eq!(app.collection.filtered_count(), 2);

        app.language_cursor = 0;
        app.toggle_language_at_cursor();
        assert!(app.is_tag_active(0));
        assert_eq!(app.collection.filtered_count(), 4);
    }

    #[test]
    fn test_sort_menu_selection() {
        let mut app = app_with(sample());
        app.open_sort_menu();
        assert_eq!(app.sort_cursor, 0);

        for _ in 0..10 {
            app.next_sort_option();
        }
        app.choose_sort_option();

        assert_eq!(app.collection.sort_key(), SortKey::Name);
        assert_eq!(app.cards()[0].name, "anx-cli");
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_paging_resets_selection() {
        let mut app = app_with(sample());
        app.next_card();
        assert_eq!(app.selected_repository().unwrap().name, "site");

        app.next_page();
        assert_eq!(app.selected_index, 0);
        assert_eq!(app.selected_repository().unwrap().name, "dots");

        app.next_card();
        app.next_card();
        assert_eq!(app.selected_repository().unwrap().name, "tool");
    }

    #[test]
    fn test_empty_account_message() {
        let app = app_with(Vec::new());
        assert_eq!(app.view_state(), ViewState::Empty);
        assert_eq!(app.empty_message(), Some("No public repositories found."));
        assert!(app.pagination().is_none());
    }

    #[test]
    fn test_popup_expires() {
        let mut app = app_with(sample());
        let now = Instant::now();
        app.show_user_popup("torvalds", now);
        assert_eq!(app.next_deadline(now), Some(USER_POPUP_DURATION));

        app.tick(now + Duration::from_secs(4));
        assert!(app.popup.is_some());
        app.tick(now + USER_POPUP_DURATION);
        assert!(app.popup.is_none());
    }

    #[test]
    fn test_announce_uses_account_login() {
        let mut app = App::new(
            PageSizing::fixed(2),
            LanguageDisplayPolicy::default(),
            Duration::from_millis(450),
            ThemePreference::Dark,
        );
        app.announce_user = true;

        // Typed as "OCTOCAT"; the API answers with the real login
        app.load(loaded(sample()), 120);
        assert_eq!(app.popup.unwrap().message, "Viewing @octocat");
    }

    #[test]
    fn test_announce_after_retry() {
        let mut app = App::new(
            PageSizing::fixed(2),
            LanguageDisplayPolicy::default(),
            Duration::from_millis(450),
            ThemePreference::Dark,
        );
        app.announce_user = true;

        app.fail(&Error::Config("offline".into()));
        assert!(app.popup.is_none());

        app.request_reload();
        app.load(loaded(sample()), 120);
        assert_eq!(app.screen, Screen::Gallery);
        assert_eq!(app.popup.as_ref().unwrap().message, "Viewing @octocat");
    }

    #[test]
    fn test_no_announce_by_default() {
        let app = app_with(sample());
        assert!(app.popup.is_none());
    }

    #[test]
    fn test_toggle_theme() {
        let mut app = app_with(sample());
        assert_eq!(app.toggle_theme(), ThemePreference::Light);
        assert_eq!(app.theme.name, "Light");
    }

    #[test]
    fn test_reload_request() {
        let mut app = app_with(sample());
        app.request_reload();
        assert!(app.reload_requested);
        assert_eq!(app.screen, Screen::Loading);
    }
}
