//! `Link` response header parsing (RFC 8288 subset used by Canvas).

use reqwest::header::{HeaderMap, LINK};

/// One `<url>; rel="..."` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    pub url: String,
    pub rels: Vec<String>,
}

impl LinkEntry {
    pub fn has_rel(&self, rel: &str) -> bool {
        self.rels.iter().any(|r| r.eq_ignore_ascii_case(rel))
    }
}

/// Parse a single `Link` header value into its entries.
///
/// `rel` may be quoted or bare and may list several space-separated
/// relation types. Entries without a `<...>` target are ignored.
pub fn parse_link_header(value: &str) -> Vec<LinkEntry> {
    let mut entries = Vec::new();
    let mut rest = value;

    while let Some(start) = rest.find('<') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('>') else {
            break;
        };
        let url = after[..end].trim().to_string();
        let tail = &after[end + 1..];
        let params_end = tail.find('<').unwrap_or(tail.len());

        let rels = tail[..params_end]
            .split(';')
            .filter_map(|param| {
                let (key, value) = param.split_once('=')?;
                key.trim().eq_ignore_ascii_case("rel").then(|| {
                    value
                        .trim()
                        .trim_end_matches(',')
                        .trim()
                        .trim_matches('"')
                        .to_string()
                })
            })
            .flat_map(|rel| {
                rel.split_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();

        entries.push(LinkEntry { url, rels });
        rest = &tail[params_end..];
    }

    entries
}

/// The `rel="next"` target across every `Link` header on a response.
pub fn next_link(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(parse_link_header)
        .find(|entry| entry.has_rel("next"))
        .map(|entry| entry.url)
}
