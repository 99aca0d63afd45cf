//! Chromium renderer backed by chromiumoxide.
//!
//! Each render session is one browser tab. Response events are assembled
//! from CDP `Network.responseReceived` (url, status, mime type) and
//! `Network.loadingFinished` (body ready), so a body read never races the
//! network stack.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chromiumoxide::Page;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFinished, EventResponseReceived, GetResponseBodyParams, RequestId,
};
use chromiumoxide::cdp::browser_protocol::page::{EventDomContentEventFired, NavigateParams};
use futures::{FutureExt, StreamExt};
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{BodyLoader, RenderFailure, RenderSession, Renderer, ResourceEvent, ResponseSubscription};
use crate::browser_setup::{LaunchOptions, launch_browser};
use crate::config::MirrorConfig;
use crate::utils::RESPONSE_EVENT_BUFFER;

/// Collects the resolved `href` of every anchor in the live document.
const ANCHOR_HREFS_SCRIPT: &str =
    "Array.from(document.querySelectorAll('a')).map(e => e.href).filter(h => typeof h === 'string' && h.length > 0)";

/// Result of shutting the browser down
#[derive(Debug, Clone)]
pub enum CleanupResult {
    /// All cleanup operations succeeded
    Success,
    /// Some cleanup operations failed, with error details
    PartialFailure(Vec<String>),
}

/// Renderer owning one Chromium process for the whole run.
pub struct ChromiumRenderer {
    browser: Browser,
    handler_task: JoinHandle<()>,
    user_data_dir: PathBuf,
    active_sessions: Arc<AtomicUsize>,
}

impl ChromiumRenderer {
    /// Launch Chromium configured for `config` (user agent, headless mode, profile dir).
    pub async fn launch(config: &MirrorConfig) -> Result<Self> {
        let launched = launch_browser(&LaunchOptions {
            headless: config.headless(),
            user_agent: config.user_agent().to_string(),
            page_load_timeout: config.page_load_timeout(),
            profile_dir: config.chrome_data_dir().cloned(),
        })
        .await
        .context("Failed to launch browser")?;

        Ok(Self {
            browser: launched.browser,
            handler_task: launched.handler_task,
            user_data_dir: launched.profile_dir,
            active_sessions: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Number of tabs currently open
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.active_sessions.load(Ordering::Relaxed)
    }

    /// Close the browser, wait for the process, remove the profile directory,
    /// then stop the CDP handler.
    ///
    /// The handler must outlive `browser.close()`, otherwise the close
    /// command never reaches Chrome.
    pub async fn shutdown(mut self) -> CleanupResult {
        let mut errors = Vec::new();

        if let Some(message) = open_tabs_warning(self.active_sessions()) {
            warn!(target: "sitemirror::cleanup", "{message}");
        }

        debug!(target: "sitemirror::cleanup", "Closing browser");
        if let Err(e) = self.browser.close().await {
            warn!(target: "sitemirror::cleanup", "Failed to close browser: {e}");
            errors.push(format!("Browser close failed: {e}"));
        }

        if let Err(e) = self.browser.wait().await {
            warn!(target: "sitemirror::cleanup", "Failed to wait for browser exit: {e}");
            errors.push(format!("Browser wait failed: {e}"));
        }

        if let Err(e) = tokio::fs::remove_dir_all(&self.user_data_dir).await {
            warn!(target: "sitemirror::cleanup", "Failed to clean up Chrome data directory: {e}");
            errors.push(format!("Directory cleanup failed: {e}"));
        }

        info!(target: "sitemirror::cleanup", "Aborting browser handler task");
        self.handler_task.abort();
        if let Err(e) = (&mut self.handler_task).await
            && !e.is_cancelled()
        {
            warn!(target: "sitemirror::cleanup", "Handler task failed during abort: {e}");
        }

        if errors.is_empty() {
            CleanupResult::Success
        } else {
            CleanupResult::PartialFailure(errors)
        }
    }
}

fn open_tabs_warning(open_tabs: usize) -> Option<String> {
    (open_tabs > 0).then(|| format!("{open_tabs} render session(s) still open at shutdown"))
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn open_session(&self) -> Result<Box<dyn RenderSession>, RenderFailure> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderFailure::Session(e.to_string()))?;

        self.active_sessions.fetch_add(1, Ordering::Relaxed);

        Ok(Box::new(ChromiumSession {
            page,
            active_sessions: Arc::clone(&self.active_sessions),
        }))
    }
}

/// One Chromium tab.
pub struct ChromiumSession {
    page: Page,
    active_sessions: Arc<AtomicUsize>,
}

/// Response metadata waiting for its `Network.loadingFinished`
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingResponse {
    url: String,
    status: u16,
    mime_type: String,
}

/// Pairs `responseReceived` with `loadingFinished` by request id.
#[derive(Debug, Default)]
struct PendingResponses {
    by_request: HashMap<String, PendingResponse>,
}

impl PendingResponses {
    /// A later response for the same request id replaces the earlier one.
    /// Status codes outside `u16` are recorded as 0.
    fn on_received(&mut self, request_id: &str, url: &str, status: i64, mime_type: &str) {
        self.by_request.insert(
            request_id.to_string(),
            PendingResponse {
                url: url.to_string(),
                status: u16::try_from(status).unwrap_or(0),
                mime_type: mime_type.to_string(),
            },
        );
    }

    fn on_finished(&mut self, request_id: &str) -> Option<PendingResponse> {
        self.by_request.remove(request_id)
    }

    fn len(&self) -> usize {
        self.by_request.len()
    }
}

fn decode_body(body: &str, base64_encoded: bool) -> Result<Vec<u8>> {
    if base64_encoded {
        BASE64
            .decode(body.as_bytes())
            .context("Response body is not valid base64")
    } else {
        Ok(body.as_bytes().to_vec())
    }
}

fn body_loader(page: Page, request_id: RequestId) -> BodyLoader {
    Box::new(move || {
        async move {
            let response = page
                .execute(GetResponseBodyParams::new(request_id))
                .await
                .context("Network.getResponseBody failed")?;
            decode_body(&response.result.body, response.result.base64_encoded)
        }
        .boxed()
    })
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn subscribe_responses(&self) -> Result<ResponseSubscription, RenderFailure> {
        let mut responses = self
            .page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(|e| RenderFailure::Session(e.to_string()))?;
        let mut finished = self
            .page
            .event_listener::<EventLoadingFinished>()
            .await
            .map_err(|e| RenderFailure::Session(e.to_string()))?;

        let (tx, rx) = mpsc::channel(RESPONSE_EVENT_BUFFER);
        let page = self.page.clone();

        let pump = tokio::spawn(async move {
            let mut pending = PendingResponses::default();

            loop {
                tokio::select! {
                    Some(event) = responses.next() => {
                        pending.on_received(
                            event.request_id.inner(),
                            &event.response.url,
                            event.response.status,
                            &event.response.mime_type,
                        );
                    }
                    Some(event) = finished.next() => {
                        let Some(response) = pending.on_finished(event.request_id.inner()) else {
                            continue;
                        };
                        let loader = body_loader(page.clone(), event.request_id.clone());
                        let resource = ResourceEvent::new(
                            response.url,
                            response.status,
                            Some(response.mime_type),
                            loader,
                        );
                        if tx.send(resource).await.is_err() {
                            break;
                        }
                    }
                    else => break,
                }
            }

            let unfinished = pending.len();
            if unfinished > 0 {
                debug!("{unfinished} response(s) never finished loading");
            }
        });

        Ok(ResponseSubscription::from_pump(rx, pump))
    }

    /// Navigate and wait for `DOMContentLoaded` only; images and other
    /// subresources may still be loading when this returns.
    async fn navigate(&self, url: &str) -> Result<(), RenderFailure> {
        let mut content_loaded = self
            .page
            .event_listener::<EventDomContentEventFired>()
            .await
            .map_err(|e| RenderFailure::Session(e.to_string()))?;

        let response = self
            .page
            .execute(NavigateParams::new(url))
            .await
            .map_err(|e| RenderFailure::Navigation(e.to_string()))?;

        if let Some(error_text) = &response.result.error_text {
            return Err(RenderFailure::Navigation(format!("{url}: {error_text}")));
        }
        // Same-document navigation has no loader and fires no DOMContentLoaded
        if response.result.loader_id.is_none() {
            return Ok(());
        }

        content_loaded
            .next()
            .await
            .map(|_| ())
            .ok_or_else(|| RenderFailure::Navigation(format!("{url}: tab closed before content loaded")))
    }

    async fn content(&self) -> Result<String, RenderFailure> {
        self.page
            .content()
            .await
            .map_err(|e| RenderFailure::Dom(e.to_string()))
    }

    async fn anchor_hrefs(&self) -> Result<Vec<String>, RenderFailure> {
        let result = self
            .page
            .evaluate(ANCHOR_HREFS_SCRIPT)
            .await
            .map_err(|e| RenderFailure::Dom(e.to_string()))?;

        result
            .into_value::<Vec<String>>()
            .map_err(|e| RenderFailure::Dom(format!("Failed to read anchor hrefs: {e}")))
    }

    async fn close(self: Box<Self>) -> Result<(), RenderFailure> {
        let Self {
            page,
            active_sessions,
        } = *self;
        active_sessions.fetch_sub(1, Ordering::Relaxed);
        page.close()
            .await
            .map_err(|e| RenderFailure::Session(e.to_string()))
    }
}
