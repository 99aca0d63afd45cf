//! Progress reporting abstraction for crawl operations
//!
//! Defines the `ProgressReporter` trait for per-task lifecycle events, a
//! log-backed implementation for the operator stream and a no-op one for
//! callers that only want the final summary.

use log::{info, warn};
use std::path::Path;

use super::crawl_types::{CaptureStats, CrawlSummary, CrawlTask, PageError, RejectReason};

/// Trait for reporting crawl progress at key lifecycle events
///
/// Called from the orchestrator loop only, never from worker tasks.
pub trait ProgressReporter: Send + Sync {
    /// A task passed every guard and its fetch is starting
    fn report_fetching(&self, task: &CrawlTask);

    /// A task was filtered before any fetch
    fn report_rejected(&self, task: &CrawlTask, reason: RejectReason);

    /// The page snapshot was written to `page_dir`
    fn report_persisted(&self, task: &CrawlTask, page_dir: &Path, capture: &CaptureStats);

    /// The task ended with a page-level failure
    fn report_failed(&self, task: &CrawlTask, error: &PageError);

    /// Traversal is exhausted
    fn report_completed(&self, summary: &CrawlSummary);
}

/// Progress reporter writing the operator stream through `log`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report_fetching(&self, task: &CrawlTask) {
        info!(target: "sitemirror::crawl", "[{}] crawling: {}", task.depth, task.url);
    }

    fn report_rejected(&self, _task: &CrawlTask, _reason: RejectReason) {
        // Rejections are routine; the orchestrator already logs them at debug level
    }

    fn report_persisted(&self, task: &CrawlTask, page_dir: &Path, capture: &CaptureStats) {
        info!(
            target: "sitemirror::crawl",
            "[{}] saved {} -> {} ({} new images)",
            task.depth,
            task.url,
            page_dir.display(),
            capture.saved
        );
    }

    fn report_failed(&self, task: &CrawlTask, error: &PageError) {
        warn!(target: "sitemirror::crawl", "[X] failed {}: {error}", task.url);
    }

    fn report_completed(&self, summary: &CrawlSummary) {
        info!(
            target: "sitemirror::crawl",
            "Mirror finished in {} ms: {} pages saved, {} failed, {} images saved",
            summary.elapsed_ms,
            summary.pages_persisted,
            summary.pages_failed,
            summary.images_saved
        );
    }
}

/// Progress reporter that does nothing
///
/// All methods are no-ops and will be inlined away by the compiler.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    #[inline(always)]
    fn report_fetching(&self, _task: &CrawlTask) {}

    #[inline(always)]
    fn report_rejected(&self, _task: &CrawlTask, _reason: RejectReason) {}

    #[inline(always)]
    fn report_persisted(&self, _task: &CrawlTask, _page_dir: &Path, _capture: &CaptureStats) {}

    #[inline(always)]
    fn report_failed(&self, _task: &CrawlTask, _error: &PageError) {}

    #[inline(always)]
    fn report_completed(&self, _summary: &CrawlSummary) {}
}
