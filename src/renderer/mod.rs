//! Renderer abstraction for browser-based page rendering.
//!
//! The crawl engine never talks to a browser directly. It opens a
//! [`RenderSession`] per page through a [`Renderer`], listens to the
//! session's response traffic, reads the final DOM and closes the session.
//! [`chromium::ChromiumRenderer`] is the production implementation.

pub mod chromium;

use std::fmt;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Failure reported by a render session.
#[derive(Debug, Error)]
pub enum RenderFailure {
    /// Navigation, network or script failure inside the browser
    #[error("navigation failed: {0}")]
    Navigation(String),
    /// DOM access (content read, script evaluation) failed
    #[error("DOM access failed: {0}")]
    Dom(String),
    /// The session could not be opened or is already gone
    #[error("render session unavailable: {0}")]
    Session(String),
}

/// Deferred read of a response body.
pub type BodyLoader = Box<dyn FnOnce() -> BoxFuture<'static, anyhow::Result<Vec<u8>>> + Send>;

/// One network response observed while a page renders.
pub struct ResourceEvent {
    pub url: String,
    pub status: u16,
    pub mime_type: Option<String>,
    body: BodyLoader,
}

impl ResourceEvent {
    #[must_use]
    pub fn new(url: impl Into<String>, status: u16, mime_type: Option<String>, body: BodyLoader) -> Self {
        Self {
            url: url.into(),
            status,
            mime_type,
            body,
        }
    }

    /// Event whose body is already in memory
    #[must_use]
    pub fn with_bytes(url: impl Into<String>, status: u16, bytes: Vec<u8>) -> Self {
        Self::new(
            url,
            status,
            None,
            Box::new(move || async move { Ok::<_, anyhow::Error>(bytes) }.boxed()),
        )
    }

    /// Read the response body. Consumes the event.
    pub async fn into_body(self) -> anyhow::Result<Vec<u8>> {
        (self.body)().await
    }
}

impl fmt::Debug for ResourceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceEvent")
            .field("url", &self.url)
            .field("status", &self.status)
            .field("mime_type", &self.mime_type)
            .finish_non_exhaustive()
    }
}

/// Subscription to a session's response events.
///
/// [`ResponseSubscription::split`] yields the event receiver and a
/// [`SubscriptionHandle`]; closing or dropping the handle stops the producer
/// while events already buffered stay readable from the receiver.
pub struct ResponseSubscription {
    events: mpsc::Receiver<ResourceEvent>,
    stop: Box<dyn FnOnce() + Send>,
}

impl ResponseSubscription {
    /// Subscription whose producer is stopped by calling `stop`
    #[must_use]
    pub fn new(events: mpsc::Receiver<ResourceEvent>, stop: impl FnOnce() + Send + 'static) -> Self {
        Self {
            events,
            stop: Box::new(stop),
        }
    }

    /// Subscription fed by a background pump task; stopping aborts the task
    #[must_use]
    pub fn from_pump(events: mpsc::Receiver<ResourceEvent>, pump: JoinHandle<()>) -> Self {
        Self::new(events, move || pump.abort())
    }

    /// Separate the event receiver from the handle that stops the producer.
    #[must_use]
    pub fn split(self) -> (mpsc::Receiver<ResourceEvent>, SubscriptionHandle) {
        let Self { events, stop } = self;
        (events, SubscriptionHandle { stop: Some(stop) })
    }
}

/// Stops the producing side of a [`ResponseSubscription`].
pub struct SubscriptionHandle {
    stop: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionHandle {
    /// Stop producing events. Idempotent.
    pub fn close(&mut self) {
        if let Some(stop) = self.stop.take() {
            stop();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// A browser engine that can open render sessions.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Open a new session (tab). The caller owns it and must close it.
    async fn open_session(&self) -> Result<Box<dyn RenderSession>, RenderFailure>;
}

/// A single page-render lifecycle.
#[async_trait]
pub trait RenderSession: Send + Sync {
    /// Start observing response traffic. Call before [`RenderSession::navigate`].
    async fn subscribe_responses(&self) -> Result<ResponseSubscription, RenderFailure>;

    /// Navigate and return once the document reached "content loaded".
    async fn navigate(&self, url: &str) -> Result<(), RenderFailure>;

    /// Serialized HTML of the live document.
    async fn content(&self) -> Result<String, RenderFailure>;

    /// Absolute `href` values of every anchor element in the live document.
    async fn anchor_hrefs(&self) -> Result<Vec<String>, RenderFailure>;

    /// Release the session. Consumes it, so it runs at most once.
    async fn close(self: Box<Self>) -> Result<(), RenderFailure>;
}
