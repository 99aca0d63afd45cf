//! Character-boundary string truncation
//!
//! Directory names are truncated by character count, never by byte index,
//! so multi-byte path segments (CJK slugs, emoji) cannot cause a panic.

/// Keep at most `max_chars` characters of `s`, cutting on a char boundary.
///
/// # Examples
/// ```
/// # use kodegen_tools_sitemirror::utils::string_utils::safe_truncate_chars;
/// assert_eq!(safe_truncate_chars("productinfo", 7), "product");
/// assert_eq!(safe_truncate_chars("产品中心", 2), "产品");
/// assert_eq!(safe_truncate_chars("Hi", 100), "Hi");
/// ```
#[inline]
pub fn safe_truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        None => s,
        Some((byte_idx, _)) => &s[..byte_idx],
    }
}
