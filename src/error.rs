//! Error types shared across the harvest pipeline.

use thiserror::Error;

/// Tier-1 (plain HTTP) fetch failures.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to read response body: {0}")]
    Body(String),
}

impl FetchError {
    /// Classify a reqwest error, separating timeouts from other transport failures.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(err)
        }
    }
}

/// Tier-2 (browser render) failures.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("browser rendering is disabled")]
    Disabled,

    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("script execution failed: {0}")]
    Script(String),

    #[error("failed to capture rendered page: {0}")]
    Capture(String),
}

/// Run-level errors surfaced to callers.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("no listings found across {pages} page(s)")]
    NoResults { pages: usize },

    #[error("invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("sink error: {0}")]
    Sink(String),
}

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;
