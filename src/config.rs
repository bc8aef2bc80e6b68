//! Configuration for listing harvesting.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables (a `.env` file is loaded by the binary first).
//! Command-line flags are applied on top by the CLI.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScrapeError};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "listings.toml";

/// Browser-like user agent sent by the HTTP tier.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scrape: ScrapeSettings,
    pub http: HttpSettings,
    pub render: RenderSettings,
    pub links: LinkSettings,
    pub dataset: DatasetSettings,
}

/// Run limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeSettings {
    /// Maximum number of listings kept for a run.
    pub max_results: usize,
    /// Upper bound on pages visited per base URL.
    pub pages_to_scrape: usize,
    /// Page fetches in flight at once (0 = all planned pages together).
    pub concurrency: usize,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            max_results: 30,
            pages_to_scrape: 20,
            concurrency: 0,
        }
    }
}

/// Tier-1 HTTP request settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub referer: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .to_string(),
            accept_language: "en-US,en;q=0.5".to_string(),
            referer: "https://internshala.com/".to_string(),
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Tier-2 browser rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Fall back to a headless browser when the HTTP tier fails.
    pub enabled: bool,
    pub headless: bool,
    /// Navigation and DevTools request timeout in seconds.
    pub timeout_secs: u64,
    /// Wait after navigation before scrolling.
    pub settle_delay_ms: u64,
    /// Wait after scrolling before capturing the DOM.
    pub scroll_delay_ms: u64,
    /// Remote Chrome DevTools URL (e.g. "ws://localhost:9222").
    pub remote_url: Option<String>,
    /// Explicit Chrome/Chromium executable.
    pub chrome_path: Option<PathBuf>,
    /// Additional Chrome arguments.
    pub chrome_args: Vec<String>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            headless: true,
            timeout_secs: 30,
            settle_delay_ms: 5000,
            scroll_delay_ms: 2000,
            remote_url: None,
            chrome_path: None,
            chrome_args: Vec::new(),
        }
    }
}

impl RenderSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn scroll_delay(&self) -> Duration {
        Duration::from_millis(self.scroll_delay_ms)
    }
}

/// How listing links are made absolute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkSettings {
    /// Origin prepended to root-relative links.
    pub origin: String,
    /// Query appended to `job_url` to form `apply_link`.
    pub referral_query: String,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            origin: "https://internshala.com".to_string(),
            referral_query: "?referral=web_share".to_string(),
        }
    }
}

/// Remote dataset endpoint for the platform sink.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetSettings {
    pub url: Option<String>,
    pub token: Option<String>,
}

impl Settings {
    /// Load settings from an explicit path, or from [`DEFAULT_CONFIG_FILE`] if it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    tracing::debug!("Using config file: {}", default_path.display());
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        Ok(settings.with_env_overrides())
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
            .map_err(|e| ScrapeError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| ScrapeError::Config(e.to_string()))
    }

    /// Apply environment variable overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(n) = var("LISTINGS_MAX_RESULTS").and_then(|v| v.parse().ok()) {
            self.scrape.max_results = n;
        }
        if let Some(n) = var("LISTINGS_PAGES").and_then(|v| v.parse().ok()) {
            self.scrape.pages_to_scrape = n;
        }
        if let Some(ua) = var("LISTINGS_USER_AGENT") {
            self.http.user_agent = ua;
        }
        if let Some(url) = var("BROWSER_URL") {
            self.render.remote_url = Some(url);
        }
        if let Some(url) = var("LISTINGS_DATASET_URL") {
            self.dataset.url = Some(url);
        }
        if let Some(token) = var("LISTINGS_DATASET_TOKEN") {
            self.dataset.token = Some(token);
        }
        self
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.scrape.max_results == 0 {
            return Err(ScrapeError::Config(
                "scrape.max_results must be greater than 0".to_string(),
            ));
        }
        if self.scrape.pages_to_scrape == 0 {
            return Err(ScrapeError::Config(
                "scrape.pages_to_scrape must be at least 1".to_string(),
            ));
        }
        if url::Url::parse(&self.links.origin).is_err() {
            return Err(ScrapeError::Config(format!(
                "links.origin is not a valid URL: {}",
                self.links.origin
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_fixed_timings() {
        let settings = Settings::default();
        assert_eq!(settings.http.timeout(), Duration::from_secs(30));
        assert_eq!(settings.render.settle_delay(), Duration::from_secs(5));
        assert_eq!(settings.render.scroll_delay(), Duration::from_secs(2));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = Settings::from_toml(
            r#"
            [scrape]
            max_results = 50

            [render]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(settings.scrape.max_results, 50);
        assert_eq!(settings.scrape.pages_to_scrape, 20);
        assert!(!settings.render.enabled);
        assert_eq!(settings.render.settle_delay_ms, 5000);
        assert_eq!(settings.http.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Settings::from_toml("[scrape]\nmax_results = \"lots\"").unwrap_err();
        assert!(matches!(err, ScrapeError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("LISTINGS_MAX_RESULTS", "12"),
            ("BROWSER_URL", "ws://localhost:9222"),
            ("LISTINGS_PAGES", ""),
        ]
        .into_iter()
        .collect();

        let settings =
            Settings::default().with_overrides_from(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(settings.scrape.max_results, 12);
        assert_eq!(settings.scrape.pages_to_scrape, 20);
        assert_eq!(
            settings.render.remote_url.as_deref(),
            Some("ws://localhost:9222")
        );
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut settings = Settings::default();
        settings.scrape.max_results = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.scrape.pages_to_scrape = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.toml");
        std::fs::write(&path, "[links]\norigin = \"https://example.com\"\n").unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.links.origin, "https://example.com");
        assert_eq!(settings.links.referral_query, "?referral=web_share");
    }
}
