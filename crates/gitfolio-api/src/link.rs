// RFC 8288 `Link` header parsing, just enough for GitHub pagination
use reqwest::header::{HeaderMap, LINK};
use reqwest::Url;

/// One `<url>; rel="name"` pair from a `Link` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRelation {
    pub url: String,
    pub rel: String,
}

/// Parse a raw `Link` header value into its relations
///
/// A single entry may carry several space-separated rel values
/// (`rel="next last"`); each becomes its own relation. Malformed
/// entries are skipped.
pub fn parse(header: &str) -> Vec<LinkRelation> {
    let mut relations = Vec::new();

    for part in header.split(',') {
        let mut segments = part.split(';');

        let target = match segments.next().map(str::trim) {
            Some(t) if t.starts_with('<') && t.ends_with('>') => &t[1..t.len() - 1],
            _ => continue,
        };

        for param in segments {
            let Some((name, value)) = param.split_once('=') else {
                continue;
            };
            if !name.trim().eq_ignore_ascii_case("rel") {
                continue;
            }

            let value = value.trim().trim_matches('"');
            for rel in value.split_whitespace() {
                relations.push(LinkRelation {
                    url: target.to_string(),
                    rel: rel.to_ascii_lowercase(),
                });
            }
        }
    }

    relations
}

/// URL of the first relation named `rel` in the response headers
pub fn find(headers: &HeaderMap, rel: &str) -> Option<String> {
    let header = headers.get(LINK)?.to_str().ok()?;
    parse(header)
        .into_iter()
        .find(|link| link.rel.eq_ignore_ascii_case(rel))
        .map(|link| link.url)
}

/// The `page` query parameter of a pagination URL
pub fn page_number(url: &str) -> Option<u32> {
    let parsed = Url::parse(url)
        .or_else(|_| Url::parse("http://localhost/").and_then(|base| base.join(url)))
        .ok()?;

    parsed
        .query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
}
