//! Main crawl orchestration logic
//!
//! Drives a mirror run to exhaustion:
//! - LIFO task stack, so a single worker reproduces depth-first order
//! - Guard chain applied as each task is popped
//! - Bounded number of concurrently rendering pages
//! - Per-task failures recorded, never propagated

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Instant;

use super::crawl_types::{CrawlSummary, CrawlTask, TaskOutcome};
use super::progress::ProgressReporter;
use super::scheduler::{CrawlContext, admit, process_admitted};
use crate::config::MirrorConfig;
use crate::renderer::Renderer;

/// Mirror everything reachable from the configured seed.
///
/// Returns once no task is pending or in flight. Individual page failures
/// show up in the summary, not as an error.
///
/// # Arguments
/// * `config` - Mirror configuration
/// * `renderer` - Browser engine used to open one session per page
/// * `progress` - Progress reporter (`LogProgress`, `NoOpProgress`)
pub async fn crawl_pages<P: ProgressReporter>(
    config: MirrorConfig,
    renderer: Arc<dyn Renderer>,
    progress: P,
) -> CrawlSummary {
    let start_time = Instant::now();
    let concurrency = config.max_concurrent_pages().max(1);

    info!(
        target: "sitemirror::crawl",
        "Mirroring {} into {} (domain: {}, max depth: {}, concurrency: {concurrency})",
        config.start_url(),
        config.storage_dir().display(),
        config.crawl_domain(),
        config.max_depth()
    );

    let mut stack = vec![CrawlTask::seed(config.start_url())];
    let ctx = Arc::new(CrawlContext::new(config, renderer));
    let mut summary = CrawlSummary::default();

    // Main concurrent crawl loop
    let mut active_tasks = FuturesUnordered::new();

    loop {
        // Fill up to concurrency limit
        while active_tasks.len() < concurrency {
            let Some(task) = stack.pop() else {
                break;
            };

            if let Err(reason) = admit(&task, &ctx.config, &ctx.visited) {
                debug!(target: "sitemirror::crawl", "Skipping {} at depth {}: {reason}", task.url, task.depth);
                record_outcome(&task, TaskOutcome::Rejected(reason), &mut summary, &mut stack, &progress);
                continue;
            }

            progress.report_fetching(&task);

            let ctx = Arc::clone(&ctx);
            active_tasks.push(tokio::spawn(async move {
                let outcome = process_admitted(&ctx, &task).await;
                (task, outcome)
            }));
        }

        // Wait for at least one task to complete
        match active_tasks.next().await {
            Some(Ok((task, outcome))) => {
                record_outcome(&task, outcome, &mut summary, &mut stack, &progress);
            }
            Some(Err(e)) => {
                error!(target: "sitemirror::crawl", "Crawl task panicked: {e}");
                summary.pages_failed += 1;
            }
            // Nothing in flight and the stack is empty
            None => break,
        }
    }

    summary.elapsed_ms = u64::try_from(start_time.elapsed().as_millis()).unwrap_or(u64::MAX);
    progress.report_completed(&summary);
    summary
}

/// Fold one terminal task state into the summary and the task stack
fn record_outcome<P: ProgressReporter>(
    task: &CrawlTask,
    outcome: TaskOutcome,
    summary: &mut CrawlSummary,
    stack: &mut Vec<CrawlTask>,
    progress: &P,
) {
    match outcome {
        TaskOutcome::Persisted {
            page_dir,
            children,
            capture,
        } => {
            summary.record_persisted(&capture);
            progress.report_persisted(task, &page_dir, &capture);
            // Reversed so the first link on the page is crawled first
            stack.extend(children.into_iter().rev());
        }
        TaskOutcome::Failed(e) => {
            summary.pages_failed += 1;
            progress.report_failed(task, &e);
        }
        TaskOutcome::Rejected(reason) => {
            summary.record_rejection(reason);
            progress.report_rejected(task, reason);
        }
    }
}
