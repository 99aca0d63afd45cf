//! Test utilities for the sitemirror test suite
//!
//! `FakeSite` is a scripted, in-memory stand-in for the browser: every page
//! is a fixed HTML string with a list of anchor hrefs and image responses,
//! and every session records what the crawler did with it.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use kodegen_tools_sitemirror::renderer::{
    RenderFailure, RenderSession, Renderer, ResourceEvent, ResponseSubscription,
};
use kodegen_tools_sitemirror::MirrorConfig;
use tokio::sync::mpsc;

/// How a scripted page reacts to navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    Load,
    /// Never reaches "content loaded"
    Hang,
    /// Navigation reports a network error
    Fail,
}

#[derive(Debug, Clone)]
pub struct FakePage {
    pub html: String,
    pub links: Vec<String>,
    pub images: Vec<(String, u16, Vec<u8>)>,
    pub behaviour: Behaviour,
}

impl FakePage {
    pub fn new(title: &str) -> Self {
        Self {
            html: format!("<html><head><title>{title}</title></head><body><h1>{title}</h1></body></html>"),
            links: Vec::new(),
            images: Vec::new(),
            behaviour: Behaviour::Load,
        }
    }

    pub fn links(mut self, links: &[&str]) -> Self {
        self.links = links.iter().map(|l| (*l).to_string()).collect();
        self
    }

    pub fn image(mut self, url: &str, status: u16, bytes: &[u8]) -> Self {
        self.images.push((url.to_string(), status, bytes.to_vec()));
        self
    }

    pub fn behaviour(mut self, behaviour: Behaviour) -> Self {
        self.behaviour = behaviour;
        self
    }
}

/// Scripted site plus counters of everything the crawler asked for
#[derive(Default)]
pub struct FakeSite {
    pages: HashMap<String, FakePage>,
    navigation_delay: Duration,
    navigations: Mutex<Vec<String>>,
    anchor_reads: AtomicUsize,
    opened: AtomicUsize,
    closed: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, page: FakePage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    /// Make every navigation take `delay`, so concurrent sessions overlap
    pub fn navigation_delay(mut self, delay: Duration) -> Self {
        self.navigation_delay = delay;
        self
    }

    pub fn into_renderer(self) -> Arc<FakeRenderer> {
        Arc::new(FakeRenderer {
            site: Arc::new(self),
        })
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }

    pub fn navigation_count(&self, url: &str) -> usize {
        self.navigations().iter().filter(|n| n.as_str() == url).count()
    }

    pub fn anchor_reads(&self) -> usize {
        self.anchor_reads.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

pub struct FakeRenderer {
    pub site: Arc<FakeSite>,
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn open_session(&self) -> Result<Box<dyn RenderSession>, RenderFailure> {
        self.site.opened.fetch_add(1, Ordering::SeqCst);
        let now = self.site.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.site.max_in_flight.fetch_max(now, Ordering::SeqCst);

        Ok(Box::new(FakeSession {
            site: Arc::clone(&self.site),
            current: Mutex::new(None),
            sender: Arc::new(Mutex::new(None)),
        }))
    }
}

struct FakeSession {
    site: Arc<FakeSite>,
    current: Mutex<Option<FakePage>>,
    sender: Arc<Mutex<Option<mpsc::Sender<ResourceEvent>>>>,
}

impl FakeSession {
    fn current(&self) -> Result<FakePage, RenderFailure> {
        self.current
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| RenderFailure::Dom("no document loaded".into()))
    }
}

#[async_trait]
impl RenderSession for FakeSession {
    async fn subscribe_responses(&self) -> Result<ResponseSubscription, RenderFailure> {
        let (tx, rx) = mpsc::channel(64);
        *self.sender.lock().unwrap() = Some(tx);

        let sender = Arc::clone(&self.sender);
        Ok(ResponseSubscription::new(rx, move || {
            sender.lock().unwrap().take();
        }))
    }

    async fn navigate(&self, url: &str) -> Result<(), RenderFailure> {
        self.site.navigations.lock().unwrap().push(url.to_string());

        if !self.site.navigation_delay.is_zero() {
            tokio::time::sleep(self.site.navigation_delay).await;
        }

        let page = self
            .site
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| RenderFailure::Navigation(format!("net::ERR_NAME_NOT_RESOLVED at {url}")))?;

        match page.behaviour {
            Behaviour::Hang => std::future::pending::<()>().await,
            Behaviour::Fail => {
                return Err(RenderFailure::Navigation(format!("net::ERR_CONNECTION_RESET at {url}")));
            }
            Behaviour::Load => {}
        }

        let sender = self.sender.lock().unwrap().clone();
        if let Some(tx) = sender {
            for (image_url, status, bytes) in &page.images {
                let _ = tx
                    .send(ResourceEvent::with_bytes(image_url.clone(), *status, bytes.clone()))
                    .await;
            }
        }

        *self.current.lock().unwrap() = Some(page);
        Ok(())
    }

    async fn content(&self) -> Result<String, RenderFailure> {
        Ok(self.current()?.html)
    }

    async fn anchor_hrefs(&self) -> Result<Vec<String>, RenderFailure> {
        self.site.anchor_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.current()?.links)
    }

    async fn close(self: Box<Self>) -> Result<(), RenderFailure> {
        self.sender.lock().unwrap().take();
        self.site.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.site.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Config for tests: no settle delay, one-second page timeout
pub fn test_config(storage_dir: &Path, start_url: &str, max_depth: u8) -> MirrorConfig {
    MirrorConfig::builder()
        .storage_dir(storage_dir.to_path_buf())
        .start_url(start_url)
        .max_depth(max_depth)
        .page_load_timeout_secs(1)
        .settle_delay_ms(0)
        .build()
        .unwrap()
}

/// Directory names directly under the mirror root, sorted
pub fn mirrored_dirs(root: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(root)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
