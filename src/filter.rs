//! Candidate URL filtering against a domain denylist.
//!
//! Search providers routinely surface aggregator and storefront pages
//! (Reddit threads, Amazon listings) whose text is worthless for ranking.
//! The filter drops those candidates by host before any fetching happens.

use url::Url;

/// Filter candidate URLs, dropping denylisted and malformed entries.
///
/// A URL is rejected when its host, lowercased and with a leading `www.`
/// removed, contains any denylist entry as a substring. URLs whose host
/// cannot be parsed are rejected rather than passed through. Surviving
/// URLs keep their original order.
pub fn filter_candidates(urls: &[String], denylist: &[String]) -> Vec<String> {
    urls.iter()
        .filter(|url| match candidate_host(url) {
            Some(host) => !is_denied(&host, denylist),
            None => {
                tracing::debug!(url = %url, "dropping candidate with unparseable host");
                false
            }
        })
        .cloned()
        .collect()
}

/// Extract the comparison host from a candidate URL.
///
/// Providers occasionally emit protocol-relative (`//example.com/x`) or
/// bare (`example.com/x`) URLs, so a failed parse is retried with an
/// `https` scheme prepended. Returns the lowercased host without a
/// leading `www.`, or `None` if no host can be extracted.
fn candidate_host(raw: &str) -> Option<String> {
    let parsed = parse_with_scheme_fallback(raw)?;
    let host = parsed.host_str()?.to_lowercase();
    let bare = host.strip_prefix("www.").unwrap_or(&host);
    Some(bare.to_owned())
}

/// Parse a URL, retrying scheme-less input with an `https` prefix.
fn parse_with_scheme_fallback(raw: &str) -> Option<Url> {
    match Url::parse(raw) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let prefixed = if raw.starts_with("//") {
                format!("https:{raw}")
            } else {
                format!("https://{raw}")
            };
            Url::parse(&prefixed).ok()
        }
        Err(_) => None,
    }
}

/// Whether a bare host matches any denylist entry.
fn is_denied(host: &str, denylist: &[String]) -> bool {
    denylist
        .iter()
        .any(|entry| host.contains(&entry.to_lowercase()))
}
