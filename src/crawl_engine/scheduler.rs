//! Per-task state machine.
//!
//! A task is first run through the guard chain (scope, depth, duplicate)
//! and, once admitted, fetched and persisted. Either step ends in a
//! terminal [`TaskOutcome`]; nothing here propagates a failure.

use log::debug;
use std::sync::Arc;

use super::crawl_types::{CrawlTask, PageError, RejectReason, TaskOutcome};
use super::link_processor::child_tasks;
use super::page_fetcher::{FetchOptions, fetch_page};
use super::visited::VisitedSet;
use crate::config::MirrorConfig;
use crate::content_saver::{prepare_page_dir, write_html};
use crate::renderer::Renderer;
use crate::utils::{is_in_scope, normalize_key, to_path_token};

/// Shared state for one mirror run, handed to every task
#[derive(Clone)]
pub struct CrawlContext {
    pub config: Arc<MirrorConfig>,
    pub visited: VisitedSet,
    pub renderer: Arc<dyn Renderer>,
}

impl CrawlContext {
    #[must_use]
    pub fn new(config: MirrorConfig, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            config: Arc::new(config),
            visited: VisitedSet::new(),
            renderer,
        }
    }
}

/// Run the guard chain. Order matters: the visited set is only touched by
/// tasks that already passed scope and depth.
///
/// # Errors
/// The first guard that rejects the task.
pub fn admit(task: &CrawlTask, config: &MirrorConfig, visited: &VisitedSet) -> Result<(), RejectReason> {
    if !is_in_scope(&task.url, config.crawl_domain()) {
        return Err(RejectReason::Scope);
    }

    if task.depth > config.max_depth() {
        return Err(RejectReason::Depth);
    }

    if !visited.try_mark_visited(normalize_key(&task.url)) {
        return Err(RejectReason::Duplicate);
    }

    Ok(())
}

/// Fetch and persist an admitted task.
///
/// Yields `Persisted` with its child tasks, or `Failed`; children are only
/// produced when the page was written.
pub async fn process_admitted(ctx: &CrawlContext, task: &CrawlTask) -> TaskOutcome {
    let config = ctx.config.as_ref();
    let path_token = to_path_token(&task.url);

    let dirs = match prepare_page_dir(config.storage_dir(), &path_token).await {
        Ok(dirs) => dirs,
        Err(e) => return TaskOutcome::Failed(PageError::page_write(&e)),
    };

    let options = FetchOptions::for_depth(config, task.depth);
    let fetched = match fetch_page(ctx.renderer.as_ref(), &task.url, &dirs.media_dir, options).await {
        Ok(page) => page,
        Err(e) => return TaskOutcome::Failed(e),
    };

    if let Err(e) = write_html(&dirs, &fetched.html).await {
        return TaskOutcome::Failed(PageError::page_write(&e));
    }
    debug!(target: "sitemirror::crawl", "Persisted {} to {}", task.url, dirs.page_dir.display());

    TaskOutcome::Persisted {
        children: child_tasks(task, &fetched.links, config.max_depth()),
        page_dir: dirs.page_dir,
        capture: fetched.capture,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_depth: u8) -> MirrorConfig {
        MirrorConfig::builder()
            .storage_dir(std::env::temp_dir().join("sitemirror-scheduler-test"))
            .start_url("https://example.com")
            .max_depth(max_depth)
            .build()
            .unwrap()
    }

    #[test]
    fn scope_is_checked_before_depth_and_dedup() {
        let config = config(1);
        let visited = VisitedSet::new();

        let offsite = CrawlTask::new("https://other.com/b", 9);
        assert_eq!(admit(&offsite, &config, &visited), Err(RejectReason::Scope));
        assert!(visited.is_empty());

        let mail = CrawlTask::new("mailto:info@example.com", 1);
        assert_eq!(admit(&mail, &config, &visited), Err(RejectReason::Scope));
    }

    #[test]
    fn depth_beyond_max_is_rejected_without_marking() {
        let config = config(1);
        let visited = VisitedSet::new();

        let deep = CrawlTask::new("https://example.com/deep", 2);
        assert_eq!(admit(&deep, &config, &visited), Err(RejectReason::Depth));
        assert!(visited.is_empty());

        let at_max = CrawlTask::new("https://example.com/deep", 1);
        assert_eq!(admit(&at_max, &config, &visited), Ok(()));
    }

    #[test]
    fn second_form_of_same_page_is_duplicate() {
        let config = config(3);
        let visited = VisitedSet::new();

        assert_eq!(admit(&CrawlTask::new("https://example.com/a", 1), &config, &visited), Ok(()));
        assert_eq!(
            admit(&CrawlTask::new("http://www.example.com/a/", 1), &config, &visited),
            Ok(()),
            "www host is a different key"
        );
        assert_eq!(
            admit(&CrawlTask::new("http://example.com/a/", 2), &config, &visited),
            Err(RejectReason::Duplicate)
        );
    }
}
