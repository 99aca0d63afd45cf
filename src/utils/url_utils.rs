//! URL normalization and mirror-path utilities.
//!
//! Two derivations live here and they are deliberately different:
//! - [`normalize_key`] identifies a logical page for deduplication
//!   (scheme, trailing slash, query and fragment are ignored).
//! - [`to_path_token`] names the page's directory inside the mirror root.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use super::constants::{HOME_PATH_TOKEN, PATH_TOKEN_MAX_CHARS};
use super::string_utils::safe_truncate_chars;

/// Characters that are not allowed in a mirror directory name.
const UNSAFE_PATH_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Canonical key identifying a logical page.
///
/// Built from `host[:port]` plus the path with one trailing `/` removed.
/// Only ever compared, never turned back into a URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for keys derived from URLs that could not be parsed.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the deduplication key for a URL.
///
/// Malformed input yields an empty (degenerate) key; callers reject such
/// URLs through the scope check before the key is ever consulted.
///
/// ```
/// # use kodegen_tools_sitemirror::utils::normalize_key;
/// assert_eq!(
///     normalize_key("https://x.com/a/"),
///     normalize_key("http://x.com/a#top"),
/// );
/// ```
#[must_use]
pub fn normalize_key(url: &str) -> NormalizedKey {
    let Ok(parsed) = Url::parse(url) else {
        return NormalizedKey(String::new());
    };

    let host = parsed.host_str().unwrap_or_default();
    let path = parsed.path();
    let path = path.strip_suffix('/').unwrap_or(path);

    let key = match parsed.port() {
        Some(port) => format!("{host}:{port}{path}"),
        None => format!("{host}{path}"),
    };
    NormalizedKey(key)
}

/// Derive the filesystem-safe directory name for a URL.
///
/// The path is trimmed of surrounding slashes, an empty path becomes
/// `home`, reserved characters become `_`, and the result is capped at
/// 100 characters. Distinct URLs can map to the same token; later writes
/// land in the same directory.
///
/// ```
/// # use kodegen_tools_sitemirror::utils::to_path_token;
/// assert_eq!(to_path_token("https://boer.cn/"), "home");
/// assert_eq!(to_path_token("https://boer.cn/productinfo/27.html"), "productinfo_27.html");
/// ```
#[must_use]
pub fn to_path_token(url: &str) -> String {
    let path = Url::parse(url)
        .map(|parsed| parsed.path().trim_matches('/').to_string())
        .unwrap_or_default();

    let path = if path.is_empty() {
        HOME_PATH_TOKEN.to_string()
    } else {
        path
    };

    let sanitized: String = path
        .chars()
        .map(|c| if UNSAFE_PATH_CHARS.contains(&c) { '_' } else { c })
        .collect();

    safe_truncate_chars(&sanitized, PATH_TOKEN_MAX_CHARS).to_string()
}

/// Drop everything from the first `#` onwards.
///
/// Works on the raw string so that links the URL parser rejects are still
/// cleaned before they reach the scope check.
#[must_use]
pub fn strip_fragment(link: &str) -> &str {
    link.split_once('#').map_or(link, |(before, _)| before)
}

/// Check if a URL is a parseable http(s) URL
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    // Skip data URLs, javascript URLs, and other non-http schemes
    if url.starts_with("data:") || url.starts_with("javascript:") || url.starts_with("mailto:") {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Check whether `url` is an http(s) URL whose host contains `crawl_domain`.
///
/// Containment rather than equality keeps `www.` and other subdomains of the
/// seed host in scope.
#[must_use]
pub fn is_in_scope(url: &str, crawl_domain: &str) -> bool {
    if !is_valid_url(url) {
        return false;
    }

    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_ascii_lowercase))
        .is_some_and(|host| !crawl_domain.is_empty() && host.contains(crawl_domain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_ignores_scheme_trailing_slash_and_fragment() {
        let a = normalize_key("https://x.com/a/");
        let b = normalize_key("http://x.com/a");
        let c = normalize_key("https://x.com/a");
        let d = normalize_key("https://x.com/a#section");
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(c, d);
        assert_eq!(a.as_str(), "x.com/a");
    }

    #[test]
    fn key_for_root_is_bare_host() {
        assert_eq!(normalize_key("https://www.boer.cn/").as_str(), "www.boer.cn");
        assert_eq!(normalize_key("http://www.boer.cn").as_str(), "www.boer.cn");
    }

    #[test]
    fn key_ignores_query_string() {
        assert_eq!(
            normalize_key("https://x.com/list?page=2"),
            normalize_key("https://x.com/list")
        );
    }

    #[test]
    fn key_strips_only_one_trailing_slash() {
        assert_eq!(normalize_key("https://x.com/a//").as_str(), "x.com/a/");
    }

    #[test]
    fn key_keeps_explicit_port() {
        assert_eq!(normalize_key("http://127.0.0.1:8080/a/").as_str(), "127.0.0.1:8080/a");
        assert_ne!(
            normalize_key("http://127.0.0.1:8080/a"),
            normalize_key("http://127.0.0.1:9090/a")
        );
    }

    #[test]
    fn malformed_url_gives_degenerate_key() {
        assert!(normalize_key("not a url").is_degenerate());
        assert!(!normalize_key("https://x.com").is_degenerate());
    }

    #[test]
    fn path_token_replaces_reserved_characters() {
        assert_eq!(to_path_token("https://x.com/a/b:c/d*e"), "a_b_c_d_e");
        assert_eq!(to_path_token("https://x.com/news/"), "news");
        assert_eq!(to_path_token("https://x.com"), "home");
        assert_eq!(to_path_token("https://x.com/?q=1"), "home");
    }

    #[test]
    fn path_token_is_truncated_to_100_chars() {
        let long = format!("https://x.com/{}", "a".repeat(250));
        assert_eq!(to_path_token(&long).chars().count(), 100);
    }

    #[test]
    fn fragment_is_stripped_from_raw_links() {
        assert_eq!(strip_fragment("/page#section"), "/page");
        assert_eq!(strip_fragment("https://x.com/a#x"), "https://x.com/a");
        assert_eq!(strip_fragment("https://x.com/a"), "https://x.com/a");
        assert_eq!(strip_fragment("#top"), "");
    }

    #[test]
    fn scope_requires_http_and_matching_host() {
        assert!(is_in_scope("https://example.com/a", "example.com"));
        assert!(is_in_scope("http://www.example.com/a", "example.com"));
        assert!(!is_in_scope("https://other.com/b", "example.com"));
        assert!(!is_in_scope("ftp://example.com/file", "example.com"));
        assert!(!is_in_scope("mailto:info@example.com", "example.com"));
        assert!(!is_in_scope("javascript:void(0)", "example.com"));
        assert!(!is_in_scope("", "example.com"));
        assert!(!is_in_scope("https://example.com/a", ""));
    }
}
