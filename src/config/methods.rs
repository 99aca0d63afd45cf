//! Optional builder setters.
//!
//! Usable before or after the required fields, so call order only matters
//! for `storage_dir` and `start_url`.

use super::builder::MirrorConfigBuilder;

impl<State> MirrorConfigBuilder<State> {
    /// Restrict the crawl to hosts containing `domain` instead of the seed host
    ///
    /// # Example
    /// ```rust
    /// # use kodegen_tools_sitemirror::config::MirrorConfig;
    /// # fn main() -> anyhow::Result<()> {
    /// let config = MirrorConfig::builder()
    ///     .storage_dir("./mirror")
    ///     .start_url("https://www.boer.cn")
    ///     .crawl_domain("boer.cn")
    ///     .build()?;
    /// assert_eq!(config.crawl_domain(), "boer.cn");
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn crawl_domain(mut self, domain: impl Into<String>) -> Self {
        self.crawl_domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn max_depth(mut self, depth: u8) -> Self {
        self.max_depth = depth;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set navigation timeout in seconds (must be non-zero)
    #[must_use]
    pub fn page_load_timeout_secs(mut self, secs: u64) -> Self {
        self.page_load_timeout_secs = secs;
        self
    }

    /// Set the post-load settle delay in milliseconds
    ///
    /// Zero disables the wait entirely, which is useful for sites without
    /// lazy-loaded content and for tests.
    #[must_use]
    pub fn settle_delay_ms(mut self, millis: u64) -> Self {
        self.settle_delay_ms = millis;
        self
    }

    /// Set the maximum number of pages rendered at once
    ///
    /// `1` (the default) keeps the crawl strictly sequential and depth-first.
    /// Higher values drain the task stack with a bounded worker pool.
    #[must_use]
    pub fn max_concurrent_pages(mut self, pages: usize) -> Self {
        self.max_concurrent_pages = pages;
        self
    }

    /// Run Chromium without a window (default `true`)
    ///
    /// Headed mode needs a display server and is only honoured in debug
    /// builds; release builds force headless.
    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }
}
