// Plain-text rendering for the non-interactive subcommands
use gitfolio_core::{render, LanguageDisplayPolicy, ProfileCard, RepositoryCollection};
use std::fmt::Write;

pub fn profile_text(card: &ProfileCard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", card.display_name, card.login);
    let _ = writeln!(out, "{}", card.bio);
    let stats: Vec<String> = card.stats.iter().map(|s| s.text()).collect();
    let _ = writeln!(out, "{}", stats.join(" | "));
    let _ = writeln!(out, "{}", card.profile_url);
    out
}

pub fn page_text(collection: &RepositoryCollection, policy: LanguageDisplayPolicy) -> String {
    if let Some(message) = render::empty_message(collection.view_state()) {
        return format!("{}\n", message);
    }

    let mut out = String::new();
    for card in render::render_cards(&collection.visible_page(), policy) {
        let fork = if card.is_fork { " (fork)" } else { "" };
        let _ = writeln!(out, "{}{}", card.name, fork);
        let _ = writeln!(out, "  {}", card.description);
        let _ = writeln!(
            out,
            "  {} | ★ {} | ⑂ {} | updated {}",
            card.language, card.stars, card.forks, card.updated
        );
        if !card.languages.is_empty() {
            let _ = writeln!(out, "  {}", card.languages.join(", "));
        }
        let _ = writeln!(out, "  {}", card.url);
    }

    if let Some(pagination) = render::render_pagination(collection) {
        let _ = writeln!(out, "\n{}", pagination.label);
    }
    out
}
