//! Chromium discovery and launch.
//!
//! A mirror run needs exactly one browser. It is found on the machine when
//! possible and otherwise downloaded once into the user cache directory.

use anyhow::{Context, Result, anyhow};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use chromiumoxide::handler::Handler;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

/// Flags applied to every mirror browser on top of user agent and profile.
const MIRROR_CHROME_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-infobars",
    "--disable-notifications",
    "--disable-extensions",
    "--disable-popup-blocking",
    "--disable-background-timer-throttling",
    "--disable-breakpad",
    "--no-first-run",
    "--no-default-browser-check",
    "--no-sandbox",
    "--password-store=basic",
    "--use-mock-keychain",
    "--mute-audio",
];

#[cfg(target_os = "windows")]
const CHROME_CANDIDATES: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files\Chromium\Application\chrome.exe",
];

#[cfg(target_os = "macos")]
const CHROME_CANDIDATES: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/opt/homebrew/bin/chromium",
];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const CHROME_CANDIDATES: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/usr/local/bin/chromium",
    "/opt/google/chrome/chrome",
];

const PATH_LOOKUP_NAMES: &[&str] = &["chromium", "chromium-browser", "google-chrome", "chrome"];

/// Slack added on top of the page deadline for chromiumoxide's own command timeout.
const CDP_TIMEOUT_MARGIN: Duration = Duration::from_secs(15);

/// How to start the browser for one run
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub headless: bool,
    pub user_agent: String,
    /// Deadline the crawl engine applies to navigation and DOM reads
    pub page_load_timeout: Duration,
    /// Profile directory; a per-process temp dir when `None`
    pub profile_dir: Option<PathBuf>,
}

/// A running browser plus what is needed to tear it down
pub struct LaunchedBrowser {
    pub browser: Browser,
    /// Drives the CDP connection; must keep running until the browser is closed
    pub handler_task: JoinHandle<()>,
    pub profile_dir: PathBuf,
}

/// Locate an installed Chrome/Chromium.
///
/// Order: `CHROMIUM_PATH`, well-known install locations, then `which`.
#[must_use]
pub fn find_browser_executable() -> Option<PathBuf> {
    if let Ok(value) = std::env::var("CHROMIUM_PATH") {
        let path = PathBuf::from(value);
        if path.exists() {
            info!("Using browser from CHROMIUM_PATH: {}", path.display());
            return Some(path);
        }
        warn!("CHROMIUM_PATH points to a missing file: {}", path.display());
    }

    if let Some(path) = CHROME_CANDIDATES.iter().map(PathBuf::from).find(|p| p.exists()) {
        info!("Found browser at: {}", path.display());
        return Some(path);
    }

    let found = which_browser();
    if found.is_none() {
        warn!("No Chrome/Chromium executable found on this machine");
    }
    found
}

fn which_browser() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        return None;
    }

    PATH_LOOKUP_NAMES.iter().find_map(|name| {
        let output = Command::new("which").arg(name).output().ok()?;
        if !output.status.success() {
            return None;
        }
        let resolved = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!resolved.is_empty()).then(|| {
            info!("Found browser on PATH: {resolved}");
            PathBuf::from(resolved)
        })
    })
}

/// Download a managed Chromium into `<cache dir>/kodegen_sitemirror/chromium`
/// and return its executable.
pub async fn download_managed_browser() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| {
            let fallback = std::env::temp_dir();
            warn!(
                "No user cache directory, downloading browser under {}",
                fallback.display()
            );
            fallback
        })
        .join("kodegen_sitemirror")
        .join("chromium");

    tokio::fs::create_dir_all(&cache_dir)
        .await
        .with_context(|| format!("Failed to create browser cache {}", cache_dir.display()))?;

    info!("Downloading managed Chromium into {}", cache_dir.display());
    let options = BrowserFetcherOptions::builder()
        .with_path(&cache_dir)
        .build()
        .context("Failed to build fetcher options")?;
    let revision = BrowserFetcher::new(options)
        .fetch()
        .await
        .context("Failed to fetch browser")?;

    info!("Chromium ready at {}", revision.folder_path.display());
    Ok(revision.executable_path)
}

/// Launch the browser described by `options`.
pub async fn launch_browser(options: &LaunchOptions) -> Result<LaunchedBrowser> {
    let executable = match find_browser_executable() {
        Some(path) => path,
        None => download_managed_browser().await?,
    };

    let profile_dir = options.profile_dir.clone().unwrap_or_else(|| {
        std::env::temp_dir().join(format!("kodegen_sitemirror_chrome_{}", std::process::id()))
    });
    tokio::fs::create_dir_all(&profile_dir)
        .await
        .with_context(|| format!("Failed to create profile directory {}", profile_dir.display()))?;

    let browser_config = browser_config(&executable, &profile_dir, options)?;

    debug!("Launching {} (headless: {})", executable.display(), options.headless);
    let (browser, handler) = Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")?;

    Ok(LaunchedBrowser {
        browser,
        handler_task: spawn_handler(handler),
        profile_dir,
    })
}

fn browser_config(
    executable: &Path,
    profile_dir: &Path,
    options: &LaunchOptions,
) -> Result<chromiumoxide::BrowserConfig> {
    let mut builder = BrowserConfigBuilder::default()
        .request_timeout(cdp_request_timeout(options.page_load_timeout))
        .window_size(1920, 1080)
        .user_data_dir(profile_dir)
        .chrome_executable(executable)
        .arg(format!("--user-agent={}", options.user_agent));

    builder = if options.headless {
        builder.headless_mode(HeadlessMode::default())
    } else {
        builder.with_head()
    };

    MIRROR_CHROME_ARGS
        .iter()
        .fold(builder, |builder, arg| builder.arg(*arg))
        .build()
        .map_err(|e| anyhow!("Failed to build browser config: {e}"))
}

/// chromiumoxide fails any command still pending after its request timeout.
/// It must stay longer than the page deadline so `RenderTimeout` fires first.
fn cdp_request_timeout(page_load_timeout: Duration) -> Duration {
    page_load_timeout.saturating_add(CDP_TIMEOUT_MARGIN)
}

fn spawn_handler(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                let message = e.to_string();
                if is_benign_cdp_error(&message) {
                    trace!("Suppressed benign CDP error: {message}");
                } else {
                    error!("Browser handler error: {e:?}");
                }
            }
        }
        debug!("Browser handler task completed");
    })
}

/// Chrome emits CDP messages chromiumoxide cannot deserialize; they are harmless.
fn is_benign_cdp_error(message: &str) -> bool {
    message.contains("data did not match any variant of untagged enum Message")
        || message.contains("Failed to deserialize WS response")
}
