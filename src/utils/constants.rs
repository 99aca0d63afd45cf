//! Shared configuration constants for sitemirror
//!
//! Default values used by the config builder and the crawl engine so the
//! same numbers are not repeated across modules.

/// Default maximum crawl depth: 5 levels
///
/// Deep enough to reach product/detail pages on typical corporate sites
/// that sit four or five clicks away from the home page.
pub const DEFAULT_MAX_DEPTH: u8 = 5;

/// Default navigation timeout: 45 seconds
pub const DEFAULT_PAGE_LOAD_TIMEOUT_SECS: u64 = 45;

/// Default settle delay after the document loads: 1 second
///
/// Gives deferred scripts and lazy-loaded images a chance to fire before
/// the final DOM is read.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 1_000;

/// Default number of render sessions in flight at once
///
/// One session reproduces a strictly sequential depth-first crawl.
pub const DEFAULT_MAX_CONCURRENT_PAGES: usize = 1;

/// Upper bound for concurrent render sessions
pub const MAX_CONCURRENT_PAGES_LIMIT: usize = 32;

/// Capacity of the per-session response event channel
pub const RESPONSE_EVENT_BUFFER: usize = 256;

/// Maximum length (in characters) of a mirror directory name
pub const PATH_TOKEN_MAX_CHARS: usize = 100;

/// Directory name used for the site root (empty URL path)
pub const HOME_PATH_TOKEN: &str = "home";

/// Sub-directory holding a page's downloaded images
pub const MEDIA_DIR_NAME: &str = "media";

/// File name of a page's HTML snapshot
pub const HTML_FILE_NAME: &str = "index.html";

/// Image extensions eligible for capture (matched case-insensitively)
pub const IMAGE_EXTENSIONS: [&str; 6] = [".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp"];

/// Chrome user agent string presented by the render session
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
