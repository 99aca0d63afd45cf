//! Core types for mirror crawling.
//!
//! Tasks, per-task outcomes, the error taxonomy for a failed page and the
//! run summary returned once traversal is exhausted.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::renderer::RenderFailure;

/// A URL scheduled for crawling at a given depth
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlTask {
    pub url: String,
    pub depth: u8,
}

impl CrawlTask {
    #[must_use]
    pub fn new(url: impl Into<String>, depth: u8) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }

    /// The depth-0 task a run starts from
    #[must_use]
    pub fn seed(url: impl Into<String>) -> Self {
        Self::new(url, 0)
    }
}

/// Why a task was dropped before any fetch. These are filtering decisions,
/// not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Not http(s), or host outside the crawl domain
    Scope,
    /// Deeper than the configured maximum depth
    Depth,
    /// Another task already claimed the same normalized key
    Duplicate,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scope => write!(f, "out of scope"),
            Self::Depth => write!(f, "depth exceeded"),
            Self::Duplicate => write!(f, "already visited"),
        }
    }
}

/// Failure that ends one task. Siblings and the run carry on.
#[derive(Debug, Error)]
pub enum PageError {
    /// Navigation did not reach "content loaded" in time
    #[error("render timed out after {0:?}")]
    RenderTimeout(Duration),

    /// Navigation, network or script failure in the browser
    #[error("render failed: {0}")]
    RenderError(#[from] RenderFailure),

    /// Page directory or HTML snapshot could not be written
    #[error("failed to write page: {0}")]
    PageWriteError(String),
}

impl PageError {
    pub(crate) fn page_write(err: &anyhow::Error) -> Self {
        // {:#} keeps the context chain
        Self::PageWriteError(format!("{err:#}"))
    }
}

/// Per-page image capture counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureStats {
    /// Images written to `media/`
    pub saved: usize,
    /// Images skipped because a non-empty file of the same name existed
    pub already_present: usize,
    /// Responses that were not status-200 images
    pub ignored: usize,
    /// Images whose body could not be read or written
    pub failed: usize,
}

/// Terminal state of one task
#[derive(Debug)]
pub enum TaskOutcome {
    Rejected(RejectReason),
    Persisted {
        page_dir: PathBuf,
        children: Vec<CrawlTask>,
        capture: CaptureStats,
    },
    Failed(PageError),
}

/// Totals for a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub pages_persisted: usize,
    pub pages_failed: usize,
    pub rejected_scope: usize,
    pub rejected_depth: usize,
    pub rejected_duplicate: usize,
    pub images_saved: usize,
    pub images_already_present: usize,
    pub images_failed: usize,
    pub elapsed_ms: u64,
}

impl CrawlSummary {
    pub(crate) fn record_rejection(&mut self, reason: RejectReason) {
        match reason {
            RejectReason::Scope => self.rejected_scope += 1,
            RejectReason::Depth => self.rejected_depth += 1,
            RejectReason::Duplicate => self.rejected_duplicate += 1,
        }
    }

    pub(crate) fn record_persisted(&mut self, capture: &CaptureStats) {
        self.pages_persisted += 1;
        self.images_saved += capture.saved;
        self.images_already_present += capture.already_present;
        self.images_failed += capture.failed;
    }

    /// Total tasks that reached a terminal state
    #[must_use]
    pub fn tasks_total(&self) -> usize {
        self.pages_persisted
            + self.pages_failed
            + self.rejected_scope
            + self.rejected_depth
            + self.rejected_duplicate
    }
}
