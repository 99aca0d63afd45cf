//! Child task derivation from a page's outbound links.

use log::debug;

use super::crawl_types::CrawlTask;
use crate::utils::strip_fragment;

/// Build the child tasks for `parent` from its anchor hrefs.
///
/// Fragments are stripped and every remaining link becomes a task at
/// `depth + 1`; scope, depth and duplicate filtering happen when the child
/// is popped, not here. Returns nothing once `parent` sits at `max_depth`.
#[must_use]
pub fn child_tasks(parent: &CrawlTask, links: &[String], max_depth: u8) -> Vec<CrawlTask> {
    if parent.depth >= max_depth {
        return Vec::new();
    }

    let depth = parent.depth.saturating_add(1);
    let children: Vec<CrawlTask> = links
        .iter()
        .map(|link| strip_fragment(link))
        .filter(|link| !link.is_empty())
        .map(|link| CrawlTask::new(link, depth))
        .collect();

    debug!(
        target: "sitemirror::crawl",
        "{} links on {} -> {} child tasks at depth {depth}",
        links.len(),
        parent.url,
        children.len()
    );
    children
}
