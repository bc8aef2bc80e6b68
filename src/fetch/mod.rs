//! Two-tier page fetching.
//!
//! Tier 1 is a plain HTTP GET with browser-like headers. When it fails
//! (non-200 status, timeout, transport error) the page is rendered once in a
//! headless browser: navigate, let it settle, scroll to the bottom to trigger
//! lazy-loaded cards, wait again and capture the DOM. Failures never escape a
//! page; the worst outcome is [`FetchOutcome::Unavailable`].

mod browser;
mod http_client;

pub use browser::{build_renderer, DisabledRenderer};
#[cfg(feature = "browser")]
pub use browser::ChromiumRenderer;
pub use http_client::HttpClient;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::RenderSettings;
use crate::error::{FetchError, RenderError};

/// Script run in the rendered page to trigger lazy loading.
pub const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// Status and body of a tier-1 response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Tier-1 capability: a single HTTP GET.
///
/// A non-200 response may come back either as [`FetchError::Status`] or as a
/// [`RawResponse`] carrying the status; both count as a tier-1 failure.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<RawResponse, FetchError>;
}

/// Tier-2 capability: a browser that opens isolated sessions (tabs).
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn open_session(&self) -> Result<Box<dyn RenderSession>, RenderError>;

    /// Release the browser at the end of a run.
    async fn shutdown(&self) {}
}

/// One browser session used to render a single page.
#[async_trait]
pub trait RenderSession: Send {
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError>;
    async fn run_script(&mut self, script: &str) -> Result<(), RenderError>;
    async fn content(&mut self) -> Result<String, RenderError>;
    async fn close(self: Box<Self>) -> Result<(), RenderError>;
}

/// Waits applied while rendering a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTiming {
    pub settle_delay: Duration,
    pub scroll_delay: Duration,
}

impl RenderTiming {
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            settle_delay: settings.settle_delay(),
            scroll_delay: settings.scroll_delay(),
        }
    }

    /// No waits; for tests and pre-rendered sources.
    pub fn immediate() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            scroll_delay: Duration::ZERO,
        }
    }
}

/// Which tier produced a page's markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Http(String),
    Rendered(String),
    Unavailable,
}

impl FetchOutcome {
    pub fn markup(&self) -> Option<&str> {
        match self {
            FetchOutcome::Http(html) | FetchOutcome::Rendered(html) => Some(html),
            FetchOutcome::Unavailable => None,
        }
    }

    pub fn into_markup(self) -> Option<String> {
        match self {
            FetchOutcome::Http(html) | FetchOutcome::Rendered(html) => Some(html),
            FetchOutcome::Unavailable => None,
        }
    }

    pub fn tier(&self) -> &'static str {
        match self {
            FetchOutcome::Http(_) => "http",
            FetchOutcome::Rendered(_) => "browser",
            FetchOutcome::Unavailable => "unavailable",
        }
    }
}

/// HTTP first, browser rendering on failure.
#[derive(Clone)]
pub struct FetchStrategy {
    fetcher: Arc<dyn PageFetcher>,
    renderer: Arc<dyn Renderer>,
    timing: RenderTiming,
}

impl FetchStrategy {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        renderer: Arc<dyn Renderer>,
        timing: RenderTiming,
    ) -> Self {
        Self {
            fetcher,
            renderer,
            timing,
        }
    }

    /// Fetch one page. Never fails; an unreachable page is `Unavailable`.
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let response = self.fetcher.get(url).await.and_then(|response| {
            if response.status == 200 {
                Ok(response)
            } else {
                Err(FetchError::Status(response.status))
            }
        });
        match response {
            Ok(response) => {
                debug!("Fetched {} over HTTP ({} bytes)", url, response.body.len());
                return FetchOutcome::Http(response.body);
            }
            Err(e) => warn!("Failed to fetch {}: {}", url, e),
        }

        info!("Falling back to browser rendering for {}", url);
        match render_page(self.renderer.as_ref(), url, &self.timing).await {
            Ok(html) => FetchOutcome::Rendered(html),
            Err(RenderError::Disabled) => {
                debug!("Browser rendering disabled; skipping {}", url);
                FetchOutcome::Unavailable
            }
            Err(e) => {
                warn!("Browser rendering failed for {}: {}", url, e);
                FetchOutcome::Unavailable
            }
        }
    }

    /// Shut down the renderer's browser, if one was started.
    pub async fn shutdown(&self) {
        self.renderer.shutdown().await;
    }
}

/// Render a URL in a fresh session; the session is closed on every path.
pub async fn render_page(
    renderer: &dyn Renderer,
    url: &str,
    timing: &RenderTiming,
) -> Result<String, RenderError> {
    let mut session = renderer.open_session().await?;
    let result = drive_session(session.as_mut(), url, timing).await;
    if let Err(e) = session.close().await {
        debug!("Failed to close browser session for {}: {}", url, e);
    }
    result
}

async fn drive_session(
    session: &mut dyn RenderSession,
    url: &str,
    timing: &RenderTiming,
) -> Result<String, RenderError> {
    session.navigate(url).await?;
    tokio::time::sleep(timing.settle_delay).await;
    session.run_script(SCROLL_TO_BOTTOM).await?;
    tokio::time::sleep(timing.scroll_delay).await;
    session.content().await
}
