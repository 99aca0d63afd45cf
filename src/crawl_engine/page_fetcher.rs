//! Single-page render: navigation, settle, DOM read and image capture.
//!
//! One render session per call. The session is released on every exit
//! path, after the capture task has drained what the session produced.

use log::{debug, warn};
use std::path::Path;
use std::time::Duration;

use super::crawl_types::{CaptureStats, PageError};
use super::page_timeout::with_page_timeout;
use super::resource_capture::ResourceCapture;
use crate::config::MirrorConfig;
use crate::renderer::{RenderSession, Renderer};

/// Timing and extraction knobs for one fetch
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// Deadline for navigation and for each DOM read
    pub timeout: Duration,
    /// Pause after "content loaded" for deferred content
    pub settle_delay: Duration,
    /// Whether to enumerate anchor hrefs
    pub extract_links: bool,
}

impl FetchOptions {
    /// Options from the run configuration for a page at `depth`
    #[must_use]
    pub fn for_depth(config: &MirrorConfig, depth: u8) -> Self {
        Self {
            timeout: config.page_load_timeout(),
            settle_delay: config.settle_delay(),
            extract_links: depth < config.max_depth(),
        }
    }
}

/// What a successful fetch produced
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    pub html: String,
    pub links: Vec<String>,
    pub capture: CaptureStats,
}

/// Render `url` and persist its images into `media_dir`.
///
/// # Errors
/// * `PageError::RenderTimeout` when navigation or a DOM read passes `options.timeout`
/// * `PageError::RenderError` when the session cannot be opened or the browser reports a failure
pub async fn fetch_page(
    renderer: &dyn Renderer,
    url: &str,
    media_dir: &Path,
    options: FetchOptions,
) -> Result<FetchedPage, PageError> {
    let session = renderer.open_session().await?;

    let result = render_with_capture(session.as_ref(), url, media_dir, options).await;

    if let Err(e) = session.close().await {
        warn!(target: "sitemirror::fetch", "Failed to close render session for {url}: {e}");
    }

    result
}

async fn render_with_capture(
    session: &dyn RenderSession,
    url: &str,
    media_dir: &Path,
    options: FetchOptions,
) -> Result<FetchedPage, PageError> {
    let (events, mut subscription) = session.subscribe_responses().await?.split();
    let capture = tokio::spawn(ResourceCapture::new(media_dir.to_path_buf()).run(events));

    let rendered = render_document(session, url, options).await;

    // Stop the producer; whatever is already buffered is still drained.
    subscription.close();
    let capture = match capture.await {
        Ok(stats) => stats,
        Err(e) => {
            warn!(target: "sitemirror::fetch", "Image capture task for {url} failed: {e}");
            CaptureStats::default()
        }
    };

    let (html, links) = rendered?;
    debug!(
        target: "sitemirror::fetch",
        "Rendered {url}: {} bytes, {} links, {} images saved",
        html.len(),
        links.len(),
        capture.saved
    );

    Ok(FetchedPage {
        html,
        links,
        capture,
    })
}

async fn render_document(
    session: &dyn RenderSession,
    url: &str,
    options: FetchOptions,
) -> Result<(String, Vec<String>), PageError> {
    with_page_timeout(session.navigate(url), options.timeout).await?;

    if !options.settle_delay.is_zero() {
        tokio::time::sleep(options.settle_delay).await;
    }

    let html = with_page_timeout(session.content(), options.timeout).await?;
    let links = if options.extract_links {
        with_page_timeout(session.anchor_hrefs(), options.timeout).await?
    } else {
        Vec::new()
    };

    Ok((html, links))
}
