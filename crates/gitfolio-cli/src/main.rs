mod output;

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use gitfolio_api::GitHubClient;
use gitfolio_cache::CacheManager;
use gitfolio_core::{
    enrich_languages, load_profile, resolve_handle, Config, GitHubProvider, LoadFailure,
    LoadedProfile, PageSizing, ProfileCard, RepositoryCollection, SortKey, ThemePreference,
};
use gitfolio_tui::{run_tui, App, RunOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "gitfolio")]
#[command(version, about = "Browse a GitHub profile and its repositories from the terminal", long_about = None)]
struct Cli {
    /// GitHub handle to show
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Link or query string carrying `user=` or `u=`
    #[arg(long, global = true)]
    link: Option<String>,

    /// Keep responses in memory only
    #[arg(long, global = true)]
    no_cache: bool,

    /// Look up each repository's full language breakdown
    #[arg(long, global = true)]
    enrich: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Print one page of repositories
    List {
        /// Filter by name, description or topic
        #[arg(short, long)]
        search: Option<String>,

        /// Only show these languages (repeatable)
        #[arg(short, long = "lang")]
        languages: Vec<String>,

        /// stars, forks, updated or name
        #[arg(long, default_value = "stars")]
        sort: String,

        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Repositories per page
        #[arg(long)]
        per_page: Option<usize>,
    },
    /// Print the profile summary
    Profile,
    /// Show the config file location and contents
    Config {
        /// Write the defaults if no config file exists yet
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The TUI owns the terminal, so keep logs quiet there
    let default_filter = if cli.command.is_none() {
        "gitfolio=warn"
    } else {
        "gitfolio=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load().context("Failed to load config")?;

    let handle = resolve_handle(
        cli.user.as_deref(),
        cli.link.as_deref(),
        &config.github.default_handle,
    );
    let enrich = cli.enrich || config.github.enrich_languages;

    match cli.command {
        None => {
            let (cache, provider) = connect(&config, cli.no_cache)?;
            let mut app = App::new(
                config.ui.page_sizing(),
                config.ui.language_policy(),
                config.ui.debounce(),
                ThemePreference::load(&cache),
            );
            app.announce_user = handle != config.github.default_handle;
            let options = RunOptions {
                enrich_languages: enrich,
                enrich_concurrency: config.github.enrich_concurrency,
            };
            run_tui(app, &provider, &handle, options, &cache).await?;
        }
        Some(Commands::Profile) => {
            let (_cache, provider) = connect(&config, cli.no_cache)?;
            let profile = fetch(&provider, &handle, false, &config).await?;
            let card = ProfileCard::from_account(&profile.account, profile.starred);
            print!("{}", output::profile_text(&card));
        }
        Some(Commands::List {
            search,
            languages,
            sort,
            page,
            per_page,
        }) => {
            let sort: SortKey = sort.parse()?;
            let (_cache, provider) = connect(&config, cli.no_cache)?;
            let profile = fetch(&provider, &handle, enrich, &config).await?;

            let sizing = per_page.map_or_else(|| config.ui.page_sizing(), PageSizing::fixed);
            let mut collection = RepositoryCollection::new(sizing);
            // Not attached to a terminal; size pages for a wide one
            collection.initialize(profile.repositories, u16::MAX);

            if let Some(term) = search {
                collection.set_search_term(&term);
            }
            apply_language_filters(&mut collection, &languages);
            collection.set_sort_key(sort);
            collection.set_page(page);

            print!("{}", output::page_text(&collection, config.ui.language_policy()));
        }
        Some(Commands::Config { init }) => show_config(&config, init)?,
    }

    Ok(())
}

/// Turn on each requested language once, matched case-insensitively
fn apply_language_filters(collection: &mut RepositoryCollection, wanted: &[String]) {
    let mut facets = BTreeSet::new();
    for name in wanted {
        match collection
            .languages()
            .iter()
            .find(|lang| lang.eq_ignore_ascii_case(name))
        {
            Some(lang) => {
                facets.insert(lang.clone());
            }
            None => tracing::warn!("No repositories use {}", name),
        }
    }

    for lang in &facets {
        collection.toggle_language_filter(lang);
    }
}

/// Open the response cache and build the GitHub-backed profile source
fn connect(
    config: &Config,
    no_cache: bool,
) -> anyhow::Result<(Arc<CacheManager>, GitHubProvider)> {
    let cache = Arc::new(if no_cache {
        CacheManager::in_memory()?
    } else {
        let path = config.cache_path()?;
        CacheManager::new(&path)
            .with_context(|| format!("Failed to open cache at {}", path.display()))?
    });

    let client = GitHubClient::with_base_url(config.github.api_url.clone())?
        .with_cache(Arc::clone(&cache))
        .with_ttl(config.cache.ttl())
        .with_page_sizes(config.github.repos_per_page, config.github.starred_per_page);

    Ok((cache, GitHubProvider::new(client)))
}

async fn fetch(
    provider: &GitHubProvider,
    handle: &str,
    enrich: bool,
    config: &Config,
) -> anyhow::Result<LoadedProfile> {
    let mut profile = load_profile(provider, handle).await.map_err(|e| {
        let failure = LoadFailure::classify(&e);
        anyhow::Error::new(e).context(failure.message())
    })?;

    if enrich {
        enrich_languages(
            provider,
            &mut profile.repositories,
            config.github.enrich_concurrency,
        )
        .await;
    }
    Ok(profile)
}

fn show_config(config: &Config, init: bool) -> anyhow::Result<()> {
    let path = Config::config_path()?;

    if init && !path.exists() {
        config.save()?;
        println!("Wrote default config to {}", path.display());
    }

    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitfolio_core::Repository;

    fn repo(name: &str, language: &str) -> Repository {
        Repository {
            name: name.into(),
            description: None,
            url: format!("https://github.com/octocat/{}", name),
            stars: 1,
            forks: 0,
            updated_at: "2024-05-01T10:00:00Z".parse().unwrap(),
            language: Some(language.into()),
            topics: Vec::new(),
            is_fork: false,
            parent_language: None,
            languages_url: None,
            languages: Vec::new(),
        }
    }

    fn collection() -> RepositoryCollection {
        let mut collection = RepositoryCollection::new(PageSizing::fixed(10));
        collection.initialize(vec![repo("a", "Rust"), repo("b", "Go"), repo("c", "Rust")], 80);
        collection
    }

    #[test]
    fn test_repeated_lang_flags_do_not_cancel() {
        let mut collection = collection();
        apply_language_filters(&mut collection, &["rust".into(), "Rust".into()]);

        assert!(collection.is_language_active("Rust"));
        assert_eq!(collection.filtered_count(), 2);
    }

    #[test]
    fn test_unknown_lang_flag_is_ignored() {
        let mut collection = collection();
        apply_language_filters(&mut collection, &["Go".into(), "Cobol".into()]);

        assert_eq!(collection.active_languages().len(), 1);
        assert_eq!(collection.filtered_count(), 1);
    }
}
