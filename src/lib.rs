//! Depth-bounded, same-domain website mirroring driven by Chromium.
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use kodegen_tools_sitemirror::{MirrorConfig, mirror_site};
//!
//! let config = MirrorConfig::builder()
//!     .storage_dir("./site_mirror")
//!     .start_url("https://www.boer.cn/")
//!     .max_depth(2)
//!     .build()?;
//! let summary = mirror_site(config).await?;
//! println!("{} pages saved", summary.pages_persisted);
//! # Ok(())
//! # }
//! ```

pub mod browser_setup;
pub mod config;
pub mod content_saver;
pub mod crawl_engine;
pub mod renderer;
pub mod utils;

use log::{debug, warn};
use std::sync::Arc;

pub use browser_setup::{LaunchOptions, LaunchedBrowser, launch_browser};
pub use config::MirrorConfig;
pub use crawl_engine::{
    CrawlSummary, CrawlTask, LogProgress, NoOpProgress, PageError, ProgressReporter, RejectReason,
    crawl_pages,
};
pub use renderer::chromium::{ChromiumRenderer, CleanupResult};
pub use renderer::{RenderFailure, RenderSession, Renderer, ResourceEvent, ResponseSubscription};
pub use utils::{normalize_key, to_path_token};

/// Mirror a site with a freshly launched Chromium, reporting through `log`.
///
/// # Errors
/// Only setup failures (browser discovery, download or launch). Page-level
/// failures are counted in the returned summary.
pub async fn mirror_site(config: MirrorConfig) -> anyhow::Result<CrawlSummary> {
    mirror_site_with_progress(config, LogProgress).await
}

/// [`mirror_site`] with a caller-supplied progress reporter.
///
/// # Errors
/// See [`mirror_site`].
pub async fn mirror_site_with_progress<P: ProgressReporter>(
    config: MirrorConfig,
    progress: P,
) -> anyhow::Result<CrawlSummary> {
    let renderer = Arc::new(ChromiumRenderer::launch(&config).await?);

    let summary = crawl_pages(config, Arc::clone(&renderer) as Arc<dyn Renderer>, progress).await;

    match Arc::try_unwrap(renderer) {
        Ok(renderer) => match renderer.shutdown().await {
            CleanupResult::Success => debug!(target: "sitemirror::cleanup", "Browser cleanup completed"),
            CleanupResult::PartialFailure(errors) => {
                warn!(target: "sitemirror::cleanup", "Cleanup completed with failures: {errors:?}");
            }
        },
        Err(arc) => warn!(
            target: "sitemirror::cleanup",
            "Browser still has {} strong references, cleanup will happen on drop",
            Arc::strong_count(&arc)
        ),
    }

    Ok(summary)
}
