//! One failing page never stops its siblings, and every session is released

use std::sync::Arc;
use std::time::Duration;

use kodegen_tools_sitemirror::crawl_engine::{FetchOptions, fetch_page};
use kodegen_tools_sitemirror::renderer::RenderFailure;
use kodegen_tools_sitemirror::{NoOpProgress, PageError, Renderer, crawl_pages};
use tempfile::TempDir;

mod common;
use common::{Behaviour, FakePage, FakeSite, test_config};

fn site_with_broken_a(behaviour: Behaviour) -> FakeSite {
    FakeSite::new()
        .page(
            "https://example.com",
            FakePage::new("Home").links(&["https://example.com/a", "https://example.com/b"]),
        )
        .page(
            "https://example.com/a",
            FakePage::new("A")
                .links(&["https://example.com/a/child"])
                .behaviour(behaviour),
        )
        .page("https://example.com/a/child", FakePage::new("Child"))
        .page("https://example.com/b", FakePage::new("B"))
}

#[tokio::test]
async fn test_timeout_does_not_stop_sibling() {
    let root = TempDir::new().unwrap();
    let renderer = site_with_broken_a(Behaviour::Hang).into_renderer();

    let config = test_config(root.path(), "https://example.com", 3);
    let summary = crawl_pages(config, Arc::clone(&renderer) as Arc<dyn Renderer>, NoOpProgress).await;

    assert!(root.path().join("b/index.html").is_file());
    assert!(!root.path().join("a/index.html").exists());
    // A failed page contributes no children
    assert_eq!(renderer.site.navigation_count("https://example.com/a/child"), 0);

    assert_eq!(summary.pages_persisted, 2);
    assert_eq!(summary.pages_failed, 1);
}

#[tokio::test]
async fn test_navigation_failures_keep_their_kind() {
    let media = TempDir::new().unwrap();
    let options = FetchOptions {
        timeout: Duration::from_millis(200),
        settle_delay: Duration::ZERO,
        extract_links: true,
    };

    let hung = site_with_broken_a(Behaviour::Hang).into_renderer();
    let result = fetch_page(hung.as_ref(), "https://example.com/a", media.path(), options).await;
    assert!(matches!(result, Err(PageError::RenderTimeout(d)) if d == options.timeout));

    let broken = site_with_broken_a(Behaviour::Fail).into_renderer();
    let result = fetch_page(broken.as_ref(), "https://example.com/a", media.path(), options).await;
    assert!(matches!(result, Err(PageError::RenderError(RenderFailure::Navigation(_)))));

    assert_eq!(hung.site.closed(), hung.site.opened());
    assert_eq!(broken.site.closed(), broken.site.opened());
}

#[tokio::test]
async fn test_render_error_does_not_stop_sibling() {
    let root = TempDir::new().unwrap();
    let renderer = site_with_broken_a(Behaviour::Fail).into_renderer();

    let config = test_config(root.path(), "https://example.com", 3);
    let summary = crawl_pages(config, Arc::clone(&renderer) as Arc<dyn Renderer>, NoOpProgress).await;

    assert!(root.path().join("b/index.html").is_file());
    assert!(!root.path().join("a/index.html").exists());
    assert_eq!(summary.pages_persisted, 2);
    assert_eq!(summary.pages_failed, 1);
}

#[tokio::test]
async fn test_unreachable_seed_still_completes() {
    let root = TempDir::new().unwrap();
    let renderer = FakeSite::new().into_renderer();

    let config = test_config(root.path(), "https://example.com", 3);
    let summary = crawl_pages(config, Arc::clone(&renderer) as Arc<dyn Renderer>, NoOpProgress).await;

    assert_eq!(summary.pages_persisted, 0);
    assert_eq!(summary.pages_failed, 1);
    assert_eq!(renderer.site.opened(), 1);
    assert_eq!(renderer.site.closed(), 1);
}

#[tokio::test]
async fn test_sessions_released_on_every_path() {
    for behaviour in [Behaviour::Load, Behaviour::Hang, Behaviour::Fail] {
        let root = TempDir::new().unwrap();
        let renderer = site_with_broken_a(behaviour).into_renderer();

        let config = test_config(root.path(), "https://example.com", 3);
        crawl_pages(config, Arc::clone(&renderer) as Arc<dyn Renderer>, NoOpProgress).await;

        let site = &renderer.site;
        assert!(site.opened() > 0);
        assert_eq!(site.opened(), site.closed(), "leaked session with {behaviour:?}");
    }
}

#[tokio::test]
async fn test_unwritable_mirror_root_fails_pages_without_rendering() {
    let root = TempDir::new().unwrap();
    let blocker = root.path().join("not-a-dir");
    std::fs::write(&blocker, b"file in the way").unwrap();

    let renderer = site_with_broken_a(Behaviour::Load).into_renderer();
    let config = test_config(&blocker, "https://example.com", 3);
    let summary = crawl_pages(config, Arc::clone(&renderer) as Arc<dyn Renderer>, NoOpProgress).await;

    assert_eq!(summary.pages_failed, 1);
    assert_eq!(summary.pages_persisted, 0);
    assert_eq!(renderer.site.opened(), 0);
}
