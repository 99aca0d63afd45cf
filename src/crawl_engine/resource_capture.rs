//! Per-page image capture.
//!
//! Consumes the response events of one render session and persists the
//! qualifying images into that page's `media/` directory. Nothing here ever
//! fails the page: every per-resource problem is logged and counted.

use log::{debug, trace};
use std::path::PathBuf;
use tokio::sync::mpsc;

use super::crawl_types::CaptureStats;
use crate::content_saver::{
    MediaSaveOutcome, is_capturable_image, media_file_name, save_media_if_absent,
};
use crate::renderer::ResourceEvent;

/// Image sink bound to a single page's media directory
#[derive(Debug, Clone)]
pub struct ResourceCapture {
    media_dir: PathBuf,
}

impl ResourceCapture {
    #[must_use]
    pub fn new(media_dir: PathBuf) -> Self {
        Self { media_dir }
    }

    /// Drain `events` until the producer stops and the buffer is empty.
    ///
    /// Events are handled one at a time, so two responses for the same file
    /// name within a page produce a single write.
    pub async fn run(self, mut events: mpsc::Receiver<ResourceEvent>) -> CaptureStats {
        let mut stats = CaptureStats::default();
        while let Some(event) = events.recv().await {
            self.on_response(event, &mut stats).await;
        }
        stats
    }

    /// Evaluate one response and persist it if it is a fresh image.
    pub async fn on_response(&self, event: ResourceEvent, stats: &mut CaptureStats) {
        if !is_capturable_image(&event.url, event.status) {
            trace!(target: "sitemirror::capture", "ignoring {} ({})", event.url, event.status);
            stats.ignored += 1;
            return;
        }

        let file_name = media_file_name(&event.url);
        let url = event.url.clone();

        match save_media_if_absent(&self.media_dir, &file_name, || event.into_body()).await {
            Ok(MediaSaveOutcome::Saved) => {
                debug!(target: "sitemirror::capture", "saved {url} as {file_name}");
                stats.saved += 1;
            }
            Ok(MediaSaveOutcome::AlreadyPresent) => {
                trace!(target: "sitemirror::capture", "{file_name} already present, skipping {url}");
                stats.already_present += 1;
            }
            Err(e) => {
                debug!(target: "sitemirror::capture", "failed to capture {url}: {e:#}");
                stats.failed += 1;
            }
        }
    }
}
