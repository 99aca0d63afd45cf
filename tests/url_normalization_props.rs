//! Property tests for dedup keys, path tokens and fragment stripping

use kodegen_tools_sitemirror::utils::{normalize_key, strip_fragment, to_path_token};
use proptest::prelude::*;

fn host() -> impl Strategy<Value = String> {
    "[a-z]{1,10}(\\.[a-z]{2,5}){1,2}"
}

fn path() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z0-9_-][a-zA-Z0-9_.-]{0,11}", 0..5).prop_map(|segments| segments.join("/"))
}

proptest! {
    #[test]
    fn key_ignores_scheme_slash_and_fragment(
        host in host(),
        path in path(),
        fragment in "[a-z0-9]{0,8}",
    ) {
        let base = normalize_key(&format!("https://{host}/{path}"));
        prop_assert_eq!(&base, &normalize_key(&format!("http://{host}/{path}")));
        prop_assert_eq!(&base, &normalize_key(&format!("https://{host}/{path}#{fragment}")));
        if !path.is_empty() {
            prop_assert_eq!(&base, &normalize_key(&format!("http://{host}/{path}/")));
        }
    }

    #[test]
    fn distinct_paths_give_distinct_keys(host in host(), a in path(), b in path()) {
        prop_assume!(a.trim_end_matches('/') != b.trim_end_matches('/'));
        prop_assert_ne!(
            normalize_key(&format!("https://{host}/{a}")),
            normalize_key(&format!("https://{host}/{b}"))
        );
    }

    #[test]
    fn path_token_is_safe_and_bounded(host in host(), raw in "[ -~]{0,300}") {
        let token = to_path_token(&format!("https://{host}/{raw}"));
        prop_assert!(!token.is_empty());
        prop_assert!(token.chars().count() <= 100);
        prop_assert!(!token.contains(['\\', '/', ':', '*', '?', '"', '<', '>', '|']));
    }

    #[test]
    fn stripped_links_have_no_fragment(link in "[ -~]{0,80}") {
        let stripped = strip_fragment(&link);
        prop_assert!(!stripped.contains('#'));
        prop_assert!(link.starts_with(stripped));
    }
}
