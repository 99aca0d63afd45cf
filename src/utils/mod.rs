pub mod constants;
pub mod string_utils;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{is_in_scope, is_valid_url, normalize_key, strip_fragment, to_path_token};
