//! Output adapters for finished runs.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};

use crate::config::DatasetSettings;
use crate::error::{Result, ScrapeError};
use crate::models::ListingRecord;

/// Destination for a run's records.
#[async_trait]
pub trait ListingSink: Send + Sync {
    /// Short name for log messages.
    fn name(&self) -> &str;

    async fn write(&self, records: &[ListingRecord]) -> Result<()>;
}

/// Output file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl OutputFormat {
    /// Guess the format from a file extension, defaulting to JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => OutputFormat::Csv,
            _ => OutputFormat::Json,
        }
    }

    /// File extension written for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }

    /// File sink for this format.
    pub fn file_sink(self, path: impl Into<PathBuf>) -> Box<dyn ListingSink> {
        match self {
            OutputFormat::Json => Box::new(JsonFileSink::new(path)),
            OutputFormat::Csv => Box::new(CsvFileSink::new(path)),
        }
    }
}

/// Pretty-printed JSON array.
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ListingSink for JsonFileSink {
    fn name(&self) -> &str {
        "json"
    }

    async fn write(&self, records: &[ListingRecord]) -> Result<()> {
        if records.is_empty() {
            warn!("No listings to write to {}", self.path.display());
            return Ok(());
        }
        let json = serde_json::to_string_pretty(records)?;
        tokio::fs::write(&self.path, json).await?;
        info!("Wrote {} listings to {}", records.len(), self.path.display());
        Ok(())
    }
}

/// CSV with a header row of every field.
pub struct CsvFileSink {
    path: PathBuf,
}

impl CsvFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ListingSink for CsvFileSink {
    fn name(&self) -> &str {
        "csv"
    }

    async fn write(&self, records: &[ListingRecord]) -> Result<()> {
        if records.is_empty() {
            warn!("No listings to write to {}", self.path.display());
            return Ok(());
        }
        tokio::fs::write(&self.path, to_csv(records)).await?;
        info!("Wrote {} listings to {}", records.len(), self.path.display());
        Ok(())
    }
}

/// Render records as CSV (CRLF line endings, quoted where needed).
pub fn to_csv(records: &[ListingRecord]) -> String {
    let mut output = String::new();
    let _ = write!(output, "{}\r\n", ListingRecord::COLUMNS.join(","));
    for record in records {
        let row: Vec<String> = record.row().iter().map(|v| escape_csv(v)).collect();
        let _ = write!(output, "{}\r\n", row.join(","));
    }
    output
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Pushes records to a remote dataset endpoint as one JSON array.
pub struct DatasetSink {
    client: Client,
    url: String,
    token: Option<String>,
}

impl DatasetSink {
    pub fn new(url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            token,
        }
    }

    /// Build from settings; fails if no dataset URL is configured.
    pub fn from_settings(settings: &DatasetSettings) -> Result<Self> {
        let url = settings.url.clone().ok_or_else(|| {
            ScrapeError::Config(
                "dataset.url is not set (use LISTINGS_DATASET_URL or [dataset] url)".to_string(),
            )
        })?;
        Ok(Self::new(url, settings.token.clone()))
    }
}

#[async_trait]
impl ListingSink for DatasetSink {
    fn name(&self) -> &str {
        "dataset"
    }

    async fn write(&self, records: &[ListingRecord]) -> Result<()> {
        if records.is_empty() {
            warn!("No listings to push to dataset");
            return Ok(());
        }

        let mut request = self.client.post(&self.url).json(records);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ScrapeError::Sink(format!("dataset push failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScrapeError::Sink(format!(
                "dataset rejected push ({}): {}",
                status, body
            )));
        }

        info!("Pushed {} listings to dataset", records.len());
        Ok(())
    }
}
