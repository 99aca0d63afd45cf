//! Crawl engine: task scheduling, page fetching and image capture.

pub mod crawl_types;
pub mod link_processor;
pub mod orchestrator;
pub mod page_fetcher;
pub mod page_timeout;
pub mod progress;
pub mod resource_capture;
pub mod scheduler;
pub mod visited;

pub use crawl_types::{CaptureStats, CrawlSummary, CrawlTask, PageError, RejectReason, TaskOutcome};
pub use orchestrator::crawl_pages;
pub use page_fetcher::{FetchOptions, FetchedPage, fetch_page};
pub use progress::{LogProgress, NoOpProgress, ProgressReporter};
pub use resource_capture::ResourceCapture;
pub use scheduler::{CrawlContext, admit, process_admitted};
pub use visited::VisitedSet;
