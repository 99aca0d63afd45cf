//! Type-safe builder for `MirrorConfig` using the typestate pattern
//!
//! This module provides a fluent builder interface with compile-time validation
//! ensuring that required fields are set before building a `MirrorConfig`.

use anyhow::{Context, Result, anyhow, bail};
use std::marker::PhantomData;
use std::path::PathBuf;
use url::Url;

use super::types::MirrorConfig;
use crate::utils::{
    CHROME_USER_AGENT, DEFAULT_MAX_CONCURRENT_PAGES, DEFAULT_MAX_DEPTH,
    DEFAULT_PAGE_LOAD_TIMEOUT_SECS, DEFAULT_SETTLE_DELAY_MS, MAX_CONCURRENT_PAGES_LIMIT,
};

// Type states for the builder
pub struct WithStorageDir;
pub struct WithStartUrl;

pub struct MirrorConfigBuilder<State = ()> {
    pub(crate) storage_dir: Option<PathBuf>,
    pub(crate) start_url: Option<String>,
    pub(crate) crawl_domain: Option<String>,
    pub(crate) max_depth: u8,
    pub(crate) user_agent: String,
    pub(crate) page_load_timeout_secs: u64,
    pub(crate) settle_delay_ms: u64,
    pub(crate) max_concurrent_pages: usize,
    pub(crate) headless: bool,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for MirrorConfigBuilder<()> {
    fn default() -> Self {
        Self {
            storage_dir: None,
            start_url: None,
            crawl_domain: None,
            max_depth: DEFAULT_MAX_DEPTH,
            user_agent: CHROME_USER_AGENT.to_string(),
            page_load_timeout_secs: DEFAULT_PAGE_LOAD_TIMEOUT_SECS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            max_concurrent_pages: DEFAULT_MAX_CONCURRENT_PAGES,
            headless: true,
            _phantom: PhantomData,
        }
    }
}

impl MirrorConfig {
    /// Create a builder for configuring a `MirrorConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> MirrorConfigBuilder<()> {
        MirrorConfigBuilder::default()
    }
}

impl<State> MirrorConfigBuilder<State> {
    fn into_state<Next>(self) -> MirrorConfigBuilder<Next> {
        MirrorConfigBuilder {
            storage_dir: self.storage_dir,
            start_url: self.start_url,
            crawl_domain: self.crawl_domain,
            max_depth: self.max_depth,
            user_agent: self.user_agent,
            page_load_timeout_secs: self.page_load_timeout_secs,
            settle_delay_ms: self.settle_delay_ms,
            max_concurrent_pages: self.max_concurrent_pages,
            headless: self.headless,
            _phantom: PhantomData,
        }
    }
}

impl MirrorConfigBuilder<()> {
    pub fn storage_dir(mut self, dir: impl Into<PathBuf>) -> MirrorConfigBuilder<WithStorageDir> {
        self.storage_dir = Some(dir.into());
        self.into_state()
    }
}

impl MirrorConfigBuilder<WithStorageDir> {
    pub fn start_url(mut self, url: impl Into<String>) -> MirrorConfigBuilder<WithStartUrl> {
        let url_string = url.into();

        // Bare hosts default to https
        let normalized_url =
            if url_string.starts_with("http://") || url_string.starts_with("https://") {
                url_string
            } else {
                format!("https://{url_string}")
            };

        self.start_url = Some(normalized_url);
        self.into_state()
    }
}

// Build method only available when all required fields are set
impl MirrorConfigBuilder<WithStartUrl> {
    pub fn build(self) -> Result<MirrorConfig> {
        let start_url = self
            .start_url
            .ok_or_else(|| anyhow!("start_url is required"))?;
        let storage_dir = self
            .storage_dir
            .ok_or_else(|| anyhow!("storage_dir is required"))?;

        let parsed = Url::parse(&start_url)
            .with_context(|| format!("Invalid start URL '{start_url}'"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("Start URL must use http or https: {start_url}");
        }
        let seed_host = parsed
            .host_str()
            .ok_or_else(|| anyhow!("Start URL has no host: {start_url}"))?
            .to_ascii_lowercase();

        let crawl_domain = match self.crawl_domain {
            Some(domain) if !domain.trim().is_empty() => domain.trim().to_ascii_lowercase(),
            Some(_) => bail!("crawl_domain must not be empty"),
            None => seed_host,
        };

        if self.max_concurrent_pages == 0 || self.max_concurrent_pages > MAX_CONCURRENT_PAGES_LIMIT {
            bail!(
                "max_concurrent_pages must be between 1 and {MAX_CONCURRENT_PAGES_LIMIT}, got {}",
                self.max_concurrent_pages
            );
        }

        if self.page_load_timeout_secs == 0 {
            bail!("page_load_timeout_secs must be greater than zero");
        }

        let storage_dir = std::path::absolute(&storage_dir)
            .with_context(|| format!("Failed to resolve storage dir {}", storage_dir.display()))?;

        // Release builds always run headless
        #[cfg(not(debug_assertions))]
        let headless = if !self.headless {
            tracing::warn!(
                "Forcing headless mode in release build. \
                Headed mode is only available in debug builds for development."
            );
            true
        } else {
            self.headless
        };

        #[cfg(debug_assertions)]
        let headless = self.headless;

        Ok(MirrorConfig {
            storage_dir,
            start_url,
            crawl_domain,
            max_depth: self.max_depth,
            user_agent: self.user_agent,
            page_load_timeout_secs: self.page_load_timeout_secs,
            settle_delay_ms: self.settle_delay_ms,
            max_concurrent_pages: self.max_concurrent_pages,
            headless,
            chrome_data_dir: None,
        })
    }
}
