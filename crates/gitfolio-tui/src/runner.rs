// TUI event loop and terminal management
use crate::app::{App, InputMode, Screen};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
};
use gitfolio_cache::CacheManager;
use gitfolio_core::{enrich_languages, load_profile, ProfileSource};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Upper bound on how long we block waiting for input
const IDLE_POLL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub enrich_languages: bool,
    pub enrich_concurrency: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            enrich_languages: false,
            enrich_concurrency: 8,
        }
    }
}

pub async fn run_tui(
    mut app: App,
    source: &dyn ProfileSource,
    handle: &str,
    options: RunOptions,
    cache: &CacheManager,
) -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app, source, handle, &options, cache).await;

    // Restore terminal even when the loop bailed out
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn event_loop<B: Backend + io::Write>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    source: &dyn ProfileSource,
    handle: &str,
    options: &RunOptions,
    cache: &CacheManager,
) -> anyhow::Result<()> {
    load(terminal, app, source, handle, options).await?;

    loop {
        terminal.draw(|f| crate::ui::render(f, app))?;

        let timeout = app
            .next_deadline(Instant::now())
            .map_or(IDLE_POLL, |d| d.min(IDLE_POLL));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key.code, cache);
                }
            }
        }

        app.tick(Instant::now());

        if app.should_quit {
            break;
        }

        if app.reload_requested {
            app.reload_requested = false;
            load(terminal, app, source, handle, options).await?;
        }
    }

    Ok(())
}

/// Fetch the profile and swap it in, or show the error page
async fn load<B: Backend + io::Write>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    source: &dyn ProfileSource,
    handle: &str,
    options: &RunOptions,
) -> anyhow::Result<()> {
    app.screen = Screen::Loading;
    terminal.draw(|f| crate::ui::render(f, app))?;
    let width = terminal.size()?.width;

    match load_profile(source, handle).await {
        Ok(mut profile) => {
            if options.enrich_languages {
                enrich_languages(source, &mut profile.repositories, options.enrich_concurrency)
                    .await;
            }
            app.load(profile, width);
            if let Some(profile) = &app.profile {
                execute!(terminal.backend_mut(), SetTitle(&profile.title))?;
            }
        }
        Err(e) => {
            warn!("Failed to load profile for {}: {}", handle, e);
            app.fail(&e);
        }
    }

    Ok(())
}

pub(crate) fn handle_key(app: &mut App, code: KeyCode, cache: &CacheManager) {
    app.status_message = None;

    match &app.screen {
        Screen::Loading => {
            if matches!(code, KeyCode::Char('q') | KeyCode::Esc) {
                app.quit();
            }
            return;
        }
        Screen::Error(_) => {
            match code {
                KeyCode::Char('r') | KeyCode::Char('R') => app.request_reload(),
                KeyCode::Char('q') | KeyCode::Esc => app.quit(),
                _ => {}
            }
            return;
        }
        Screen::Gallery => {}
    }

    let now = Instant::now();
    match app.input_mode {
        InputMode::Searching => match code {
            KeyCode::Enter => app.commit_search(),
            KeyCode::Esc => app.enter_normal_mode(),
            KeyCode::Backspace => app.pop_search_char(now),
            KeyCode::Char(c) => app.push_search_char(c, now),
            _ => {}
        },
        InputMode::Languages => match code {
            KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab => app.previous_language(),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => app.next_language(),
            KeyCode::Char(' ') | KeyCode::Enter => app.toggle_language_at_cursor(),
            KeyCode::Esc | KeyCode::Char('q') => app.enter_normal_mode(),
            _ => {}
        },
        InputMode::SortMenu => match code {
            KeyCode::Down | KeyCode::Char('j') => app.next_sort_option(),
            KeyCode::Up | KeyCode::Char('k') => app.previous_sort_option(),
            KeyCode::Enter => app.choose_sort_option(),
            KeyCode::Esc | KeyCode::Char('q') => app.enter_normal_mode(),
            _ => {}
        },
        InputMode::Help => {
            if matches!(code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.enter_normal_mode();
            }
        }
        InputMode::Normal => match code {
            KeyCode::Char('q') => app.quit(),
            KeyCode::Char('/') => app.enter_search_mode(),
            KeyCode::Char('x') => app.clear_search(),
            KeyCode::Char('l') => app.enter_language_mode(),
            KeyCode::Char('s') => app.open_sort_menu(),
            KeyCode::Char('n') | KeyCode::Right => app.next_page(),
            KeyCode::Char('p') | KeyCode::Left => app.previous_page(),
            KeyCode::Char('j') | KeyCode::Down => app.next_card(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_card(),
            KeyCode::Char('r') => app.request_reload(),
            KeyCode::Char('?') => app.show_help(),
            KeyCode::Char('t') => {
                let preference = app.toggle_theme();
                if let Err(e) = preference.save(cache) {
                    warn!("Failed to save theme preference: {}", e);
                    app.status_message = Some(format!("Could not save theme: {}", e));
                }
            }
            KeyCode::Enter => {
                if let Some(url) = app.selected_repository().map(|r| r.url.clone()) {
                    open_in_browser(app, &url);
                }
            }
            KeyCode::Char('o') => {
                if let Some(url) = app.profile.as_ref().map(|p| p.profile_url.clone()) {
                    open_in_browser(app, &url);
                }
            }
            _ => {}
        },
    }
}

fn open_in_browser(app: &mut App, url: &str) {
    debug!("Opening {}", url);
    match open::that(url) {
        Ok(()) => app.status_message = Some(format!("Opened {}", url)),
        Err(e) => app.status_message = Some(format!("Failed to open browser: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use gitfolio_core::{
        Account, Error, LanguageDisplayPolicy, LoadedProfile, PageSizing, Repository,
        StarredCount, ThemePreference,
    };

    fn repo(name: &str, stars: u32) -> Repository {
        Repository {
            name: name.into(),
            description: None,
            url: format!("https://github.com/octocat/{}", name),
            stars,
            forks: 0,
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            language: Some("Rust".into()),
            topics: Vec::new(),
            is_fork: false,
            parent_language: None,
            languages_url: None,
            languages: Vec::new(),
        }
    }

    fn gallery() -> App {
        let mut app = App::new(
            PageSizing::fixed(2),
            LanguageDisplayPolicy::default(),
            Duration::from_millis(450),
            ThemePreference::Dark,
        );
        app.load(
            LoadedProfile {
                account: Account {
                    login: "octocat".into(),
                    name: None,
                    avatar_url: String::new(),
                    profile_url: "https://github.com/octocat".into(),
                    bio: None,
                    followers: 0,
                    following: 0,
                    public_repos: 3,
                },
                repositories: vec![repo("a", 3), repo("b", 2), repo("c", 1)],
                starred: StarredCount::Count(0),
            },
            120,
        );
        app
    }

    #[test]
    fn test_search_keys() {
        let cache = CacheManager::in_memory().unwrap();
        let mut app = gallery();

        handle_key(&mut app, KeyCode::Char('/'), &cache);
        assert_eq!(app.input_mode, InputMode::Searching);

        // 'q' is text while searching
        handle_key(&mut app, KeyCode::Char('q'), &cache);
        assert!(!app.should_quit);
        handle_key(&mut app, KeyCode::Backspace, &cache);
        handle_key(&mut app, KeyCode::Char('b'), &cache);
        handle_key(&mut app, KeyCode::Enter, &cache);

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.collection.filtered_count(), 1);

        handle_key(&mut app, KeyCode::Char('x'), &cache);
        assert_eq!(app.collection.filtered_count(), 3);
    }

    #[test]
    fn test_paging_keys() {
        let cache = CacheManager::in_memory().unwrap();
        let mut app = gallery();

        handle_key(&mut app, KeyCode::Char('n'), &cache);
        assert_eq!(app.collection.current_page(), 2);
        handle_key(&mut app, KeyCode::Right, &cache);
        assert_eq!(app.collection.current_page(), 2);
        handle_key(&mut app, KeyCode::Left, &cache);
        assert_eq!(app.collection.current_page(), 1);
    }

    #[test]
    fn test_theme_toggle_is_persisted() {
        let cache = CacheManager::in_memory().unwrap();
        let mut app = gallery();

        handle_key(&mut app, KeyCode::Char('t'), &cache);
        assert_eq!(app.theme_preference, ThemePreference::Light);
        assert_eq!(ThemePreference::load(&cache), ThemePreference::Light);
    }

    #[test]
    fn test_error_screen_retry_and_quit() {
        let cache = CacheManager::in_memory().unwrap();
        let mut app = gallery();
        app.fail(&Error::Config("boom".into()));

        // Gallery keys do nothing here
        handle_key(&mut app, KeyCode::Char('n'), &cache);
        assert!(!app.reload_requested);

        handle_key(&mut app, KeyCode::Char('r'), &cache);
        assert!(app.reload_requested);

        app.fail(&Error::Config("boom".into()));
        handle_key(&mut app, KeyCode::Char('q'), &cache);
        assert!(app.should_quit);
    }

    #[test]
    fn test_help_overlay() {
        let cache = CacheManager::in_memory().unwrap();
        let mut app = gallery();

        handle_key(&mut app, KeyCode::Char('?'), &cache);
        assert_eq!(app.input_mode, InputMode::Help);
        handle_key(&mut app, KeyCode::Char('q'), &cache);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(!app.should_quit);
    }
}
