use reqwest::Url;

/// Pick the account to show
///
/// An explicit handle wins, then a `user` or `u` parameter from a pasted
/// link or query string (`?u=octocat`), then the configured default.
pub fn resolve_handle(explicit: Option<&str>, link: Option<&str>, default: &str) -> String {
    explicit
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .or_else(|| link.and_then(handle_from_query))
        .unwrap_or_else(|| default.to_string())
}

/// `user` takes priority over `u` when both are present
pub fn handle_from_query(link: &str) -> Option<String> {
    let link = link.trim();
    let url = Url::parse(link)
        .or_else(|_| {
            let query = link.trim_start_matches('?');
            Url::parse(&format!("http://localhost/?{}", query))
        })
        .ok()?;

    let lookup = |name: &str| {
        url.query_pairs()
            .find(|(key, value)| key == name && !value.trim().is_empty())
            .map(|(_, value)| value.trim().to_string())
    };

    lookup("user").or_else(|| lookup("u"))
}
