//! Core configuration types for site mirroring
//!
//! This module contains the main `MirrorConfig` struct that defines the
//! parameters of one mirror run.

use serde::Serialize;
use std::path::PathBuf;

/// Main configuration struct for a mirror run
///
/// Only constructed through `MirrorConfig::builder()`, which validates every field.
#[derive(Debug, Clone, Serialize)]
pub struct MirrorConfig {
    /// Mirror output root. Every crawled page gets `<storage_dir>/<path token>/`.
    ///
    /// **INVARIANT:** Always an absolute path (normalized in builder).
    pub(crate) storage_dir: PathBuf,

    /// Seed URL, crawled at depth 0
    pub(crate) start_url: String,

    /// Domain boundary. A URL is in scope when its host contains this string.
    ///
    /// Defaults to the seed URL's host.
    pub(crate) crawl_domain: String,

    /// Deepest level that is still fetched. Pages at this depth never spawn children.
    pub(crate) max_depth: u8,

    /// User agent presented by the render sessions
    pub(crate) user_agent: String,

    /// Timeout in seconds for navigating to a page and reaching "content loaded"
    ///
    /// Default: 45 seconds
    pub(crate) page_load_timeout_secs: u64,

    /// Delay in milliseconds between document load and reading the final DOM
    ///
    /// Default: 1000 milliseconds
    pub(crate) settle_delay_ms: u64,

    /// Maximum number of render sessions in flight
    /// Default: 1 (sequential depth-first), Range: 1-32
    pub(crate) max_concurrent_pages: usize,

    /// Run the browser without a window
    pub(crate) headless: bool,

    /// Chrome profile directory; a per-process temp dir is used when unset
    #[serde(skip)]
    pub(crate) chrome_data_dir: Option<PathBuf>,
}

impl MirrorConfig {
    /// Use `dir` as the Chrome profile instead of a per-process temp dir
    ///
    /// # Example
    /// ```rust
    /// # use kodegen_tools_sitemirror::config::MirrorConfig;
    /// # fn main() -> anyhow::Result<()> {
    /// let chrome_dir = std::env::temp_dir().join("chrome_mirror_session");
    /// let config = MirrorConfig::builder()
    ///     .storage_dir("./mirror")
    ///     .start_url("https://example.com")
    ///     .build()?
    ///     .with_chrome_data_dir(chrome_dir);
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn with_chrome_data_dir(mut self, dir: PathBuf) -> Self {
        self.chrome_data_dir = Some(dir);
        self
    }
}
