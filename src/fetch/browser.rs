//! Headless browser renderer for client-rendered listing pages.
//!
//! Uses chromiumoxide (CDP). One browser is launched lazily on the first
//! tier-2 fetch of a run and shared by all pages; every page renders in its
//! own tab, which is closed when the page is done.

use std::sync::Arc;

use async_trait::async_trait;
#[cfg(not(feature = "browser"))]
use tracing::warn;

use super::{RenderSession, Renderer};
use crate::config::RenderSettings;
use crate::error::RenderError;

/// Renderer used when browser rendering is turned off.
pub struct DisabledRenderer;

#[async_trait]
impl Renderer for DisabledRenderer {
    async fn open_session(&self) -> Result<Box<dyn RenderSession>, RenderError> {
        Err(RenderError::Disabled)
    }
}

/// Pick the tier-2 renderer for the given settings.
pub fn build_renderer(settings: &RenderSettings, user_agent: &str) -> Arc<dyn Renderer> {
    if !settings.enabled {
        return Arc::new(DisabledRenderer);
    }

    #[cfg(feature = "browser")]
    {
        Arc::new(ChromiumRenderer::new(settings.clone(), user_agent))
    }

    #[cfg(not(feature = "browser"))]
    {
        let _ = user_agent;
        warn!("Browser rendering requested but not compiled. Rebuild with: cargo build --features browser");
        Arc::new(DisabledRenderer)
    }
}

/// Where the tier-2 browser comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
enum BrowserOrigin {
    /// Spawned by this process.
    Launched,
    /// An existing remote Chrome reached over DevTools.
    Connected,
}

#[cfg_attr(not(feature = "browser"), allow(dead_code))]
impl BrowserOrigin {
    fn for_settings(settings: &RenderSettings) -> Self {
        if settings.remote_url.is_some() {
            BrowserOrigin::Connected
        } else {
            BrowserOrigin::Launched
        }
    }

    /// Only a browser this process started is closed at shutdown; a remote
    /// one is shared and just disconnected.
    fn closes_on_shutdown(self) -> bool {
        self == BrowserOrigin::Launched
    }
}

#[cfg(feature = "browser")]
pub use chromium::ChromiumRenderer;

#[cfg(feature = "browser")]
mod chromium {
    use std::path::PathBuf;

    use async_trait::async_trait;
    use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
    use chromiumoxide::{Browser, BrowserConfig, Page};
    use futures::StreamExt;
    use tokio::sync::Mutex;
    use tracing::{debug, info, warn};

    use super::super::{RenderSession, Renderer};
    use super::BrowserOrigin;
    use crate::config::RenderSettings;
    use crate::error::RenderError;

    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &[&str] = &[
        // Linux
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        "/opt/google/chrome/google-chrome",
    ];

    /// Chromium renderer with a lazily launched, shared browser.
    pub struct ChromiumRenderer {
        settings: RenderSettings,
        user_agent: String,
        browser: Mutex<Option<RunningBrowser>>,
    }

    struct RunningBrowser {
        browser: Browser,
        origin: BrowserOrigin,
    }

    impl ChromiumRenderer {
        pub fn new(settings: RenderSettings, user_agent: &str) -> Self {
            Self {
                settings,
                user_agent: user_agent.to_string(),
                browser: Mutex::new(None),
            }
        }

        fn find_chrome(&self) -> Result<PathBuf, RenderError> {
            if let Some(ref path) = self.settings.chrome_path {
                if path.exists() {
                    return Ok(path.clone());
                }
                warn!("Configured Chrome path does not exist: {}", path.display());
            }

            for path in CHROME_PATHS {
                let p = std::path::Path::new(path);
                if p.exists() {
                    debug!("Found Chrome at: {}", path);
                    return Ok(p.to_path_buf());
                }
            }

            for cmd in &[
                "chromium",
                "chromium-browser",
                "google-chrome",
                "google-chrome-stable",
            ] {
                if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
                    if output.status.success() {
                        let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                        if !path.is_empty() {
                            debug!("Found Chrome in PATH: {}", path);
                            return Ok(PathBuf::from(path));
                        }
                    }
                }
            }

            Err(RenderError::Launch(
                "Chrome/Chromium not found; install it or set render.chrome_path".to_string(),
            ))
        }

        async fn start(&self) -> Result<RunningBrowser, RenderError> {
            let origin = BrowserOrigin::for_settings(&self.settings);
            let browser = match self.settings.remote_url {
                Some(ref remote_url) => self.connect_remote(remote_url).await?,
                None => self.launch().await?,
            };
            Ok(RunningBrowser { browser, origin })
        }

        async fn launch(&self) -> Result<Browser, RenderError> {
            info!("Launching browser (headless={})", self.settings.headless);
            let chrome_path = self.find_chrome()?;

            let mut builder = BrowserConfig::builder()
                .chrome_executable(chrome_path)
                .request_timeout(self.settings.timeout());

            if !self.settings.headless {
                builder = builder.with_head();
            }

            builder = builder
                .arg("--disable-blink-features=AutomationControlled")
                .arg("--disable-dev-shm-usage")
                .arg("--no-first-run")
                .arg("--no-default-browser-check")
                .arg("--no-sandbox")
                .arg("--disable-gpu");

            for arg in &self.settings.chrome_args {
                builder = builder.arg(arg);
            }

            let config = builder.build().map_err(RenderError::Launch)?;

            let (browser, mut handler) = Browser::launch(config)
                .await
                .map_err(|e| RenderError::Launch(e.to_string()))?;

            tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            Ok(browser)
        }

        /// Connect to a remote Chrome instance via its /json/version endpoint.
        async fn connect_remote(&self, url: &str) -> Result<Browser, RenderError> {
            info!("Connecting to remote browser at {}", url);

            let http_url = url
                .replace("ws://", "http://")
                .replace("wss://", "https://");
            let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

            let resp: serde_json::Value = reqwest::Client::new()
                .get(&version_url)
                .send()
                .await
                .map_err(|e| RenderError::Launch(format!("remote browser unreachable: {}", e)))?
                .json()
                .await
                .map_err(|e| RenderError::Launch(format!("bad browser version info: {}", e)))?;

            let ws_url = resp
                .get("webSocketDebuggerUrl")
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    RenderError::Launch("no webSocketDebuggerUrl in response".to_string())
                })?;

            let handler_config = chromiumoxide::handler::HandlerConfig {
                request_timeout: self.settings.timeout(),
                ..Default::default()
            };

            let (browser, mut handler) = Browser::connect_with_config(ws_url, handler_config)
                .await
                .map_err(|e| RenderError::Launch(e.to_string()))?;

            tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            Ok(browser)
        }
    }

    #[async_trait]
    impl Renderer for ChromiumRenderer {
        async fn open_session(&self) -> Result<Box<dyn RenderSession>, RenderError> {
            let mut guard = self.browser.lock().await;
            if guard.is_none() {
                *guard = Some(self.start().await?);
            }
            let running = guard
                .as_ref()
                .ok_or_else(|| RenderError::Launch("browser not running".to_string()))?;

            let page = running
                .browser
                .new_page("about:blank")
                .await
                .map_err(|e| RenderError::Launch(e.to_string()))?;
            drop(guard);

            page.execute(SetUserAgentOverrideParams::new(self.user_agent.clone()))
                .await
                .map_err(|e| RenderError::Navigation(e.to_string()))?;

            Ok(Box::new(ChromiumSession { page }))
        }

        async fn shutdown(&self) {
            let Some(mut running) = self.browser.lock().await.take() else {
                return;
            };
            if !running.origin.closes_on_shutdown() {
                debug!("Disconnecting from remote browser");
                return;
            }
            if let Err(e) = running.browser.close().await {
                debug!("Browser close failed: {}", e);
            }
            let _ = running.browser.wait().await;
        }
    }

    /// A single tab.
    struct ChromiumSession {
        page: Page,
    }

    #[async_trait]
    impl RenderSession for ChromiumSession {
        async fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
            self.page
                .goto(url)
                .await
                .map(|_| ())
                .map_err(|e| RenderError::Navigation(e.to_string()))
        }

        async fn run_script(&mut self, script: &str) -> Result<(), RenderError> {
            self.page
                .evaluate(script)
                .await
                .map(|_| ())
                .map_err(|e| RenderError::Script(e.to_string()))
        }

        async fn content(&mut self) -> Result<String, RenderError> {
            self.page
                .content()
                .await
                .map_err(|e| RenderError::Capture(e.to_string()))
        }

        async fn close(self: Box<Self>) -> Result<(), RenderError> {
            self.page
                .close()
                .await
                .map_err(|e| RenderError::Capture(e.to_string()))
        }
    }
}
