//! Run coordinator: plan pages, fetch them concurrently, extract and aggregate.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::ProgressBar;
use scraper::Html;
use tracing::{debug, info, warn};

use crate::aggregate::{Admission, Aggregator};
use crate::config::{ScrapeSettings, Settings};
use crate::error::{Result, ScrapeError};
use crate::extract::{CardLocator, CardOutcome, FieldExtractor, LocateStrategy};
use crate::fetch::{build_renderer, FetchOutcome, FetchStrategy, HttpClient, RenderTiming};
use crate::models::ListingRecord;
use crate::normalize::normalize_results;
use crate::planner::PagePlan;

/// What one page contributed to a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    pub url: String,
    /// Tier that produced the markup ("http", "browser" or "unavailable").
    pub tier: &'static str,
    pub strategy: LocateStrategy,
    pub cards: usize,
    pub accepted: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

impl PageReport {
    fn new(url: &str, tier: &'static str) -> Self {
        Self {
            url: url.to_string(),
            tier,
            strategy: LocateStrategy::NotFound,
            cards: 0,
            accepted: 0,
            duplicates: 0,
            skipped: 0,
        }
    }
}

/// Result of a run: normalized records plus per-page reports in completion order.
#[derive(Debug, Clone)]
pub struct ScrapeReport {
    pub records: Vec<ListingRecord>,
    pub pages: Vec<PageReport>,
}

impl ScrapeReport {
    /// Pages for which neither tier produced markup.
    pub fn unavailable_pages(&self) -> usize {
        self.pages.iter().filter(|p| p.tier == "unavailable").count()
    }

    pub fn duplicates(&self) -> usize {
        self.pages.iter().map(|p| p.duplicates).sum()
    }
}

/// Listing scraper for one configuration.
pub struct Scraper {
    limits: ScrapeSettings,
    fetch: FetchStrategy,
    locator: CardLocator,
    extractor: FieldExtractor,
    progress: ProgressBar,
}

impl Scraper {
    /// Build a scraper with the reqwest client and the configured renderer.
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = HttpClient::new(&settings.http)
            .map_err(|e| ScrapeError::Config(format!("failed to build HTTP client: {}", e)))?;
        let renderer = build_renderer(&settings.render, &settings.http.user_agent);
        let fetch = FetchStrategy::new(
            Arc::new(client),
            renderer,
            RenderTiming::from_settings(&settings.render),
        );
        Self::with_fetch_strategy(settings, fetch)
    }

    /// Build a scraper around an existing fetch strategy.
    pub fn with_fetch_strategy(settings: &Settings, fetch: FetchStrategy) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            limits: settings.scrape.clone(),
            fetch,
            locator: CardLocator::new()?,
            extractor: FieldExtractor::new(&settings.links)?,
            progress: ProgressBar::hidden(),
        })
    }

    /// Report page progress on this bar; its length is set per run.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Plan pages for one base URL and run.
    pub async fn run_base(&self, base_url: &str) -> Result<ScrapeReport> {
        self.run_bases(&[base_url]).await
    }

    /// Plan pages for each base URL independently and run them as one job.
    pub async fn run_bases<S: AsRef<str>>(&self, base_urls: &[S]) -> Result<ScrapeReport> {
        let urls: Vec<String> = base_urls
            .iter()
            .flat_map(|base| {
                PagePlan::new(
                    base.as_ref(),
                    self.limits.max_results,
                    self.limits.pages_to_scrape,
                )
                .into_urls()
            })
            .collect();
        self.run(urls).await
    }

    /// Fetch and extract the given page URLs.
    ///
    /// Pages are processed in completion order. Once the result cap is
    /// reached no further pages are scheduled; pages already in flight are
    /// finished but contribute nothing. Fails with [`ScrapeError::NoResults`]
    /// only when no listing was accepted.
    pub async fn run(&self, urls: Vec<String>) -> Result<ScrapeReport> {
        let aggregator = Aggregator::new(self.limits.max_results);
        let limit = match self.limits.concurrency {
            0 => urls.len().max(1),
            n => n,
        };

        info!(
            "Scraping up to {} pages for {} listings",
            urls.len(),
            self.limits.max_results
        );
        self.progress.set_length(urls.len() as u64);

        let mut pending = urls.into_iter();
        let mut in_flight = FuturesUnordered::new();
        let mut pages = Vec::new();

        loop {
            while in_flight.len() < limit && !aggregator.is_full() {
                match pending.next() {
                    Some(url) => in_flight.push(self.fetch_page(url)),
                    None => break,
                }
            }

            let Some((url, outcome)) = in_flight.next().await else {
                break;
            };

            let report = self.process_page(&url, outcome, &aggregator);
            self.progress.set_message(format!(
                "{} listings ({} from {})",
                aggregator.len(),
                report.accepted,
                report.url
            ));
            self.progress.inc(1);
            pages.push(report);
        }

        let skipped_pages = pending.len();
        if skipped_pages > 0 {
            debug!("Result cap reached; {} pages not fetched", skipped_pages);
        }

        self.fetch.shutdown().await;
        self.progress.finish_and_clear();

        let records = normalize_results(aggregator.into_records());
        if records.is_empty() {
            return Err(ScrapeError::NoResults { pages: pages.len() });
        }

        info!(
            "Collected {} listings from {} pages",
            records.len(),
            pages.len()
        );
        Ok(ScrapeReport { records, pages })
    }

    async fn fetch_page(&self, url: String) -> (String, FetchOutcome) {
        let outcome = self.fetch.fetch(&url).await;
        (url, outcome)
    }

    fn process_page(&self, url: &str, outcome: FetchOutcome, aggregator: &Aggregator) -> PageReport {
        let mut report = PageReport::new(url, outcome.tier());
        let Some(markup) = outcome.into_markup() else {
            return report;
        };

        let document = Html::parse_document(&markup);
        let located = self.locator.locate(&document);
        report.cards = located.cards.len();
        report.strategy = located.strategy;

        if located.cards.is_empty() {
            warn!("No listing cards found on {}", url);
            return report;
        }

        for card in located.cards {
            if aggregator.is_full() {
                break;
            }
            match self.extractor.extract(card) {
                CardOutcome::Accepted(record) => match aggregator.admit(record) {
                    Admission::Accepted => report.accepted += 1,
                    Admission::Duplicate => report.duplicates += 1,
                    Admission::CapReached => break,
                },
                CardOutcome::Skipped(reason) => {
                    debug!("Skipping card on {}: {}", url, reason);
                    report.skipped += 1;
                }
            }
        }

        info!(
            "Page {} ({}, {}): {} cards, {} accepted",
            url, report.tier, report.strategy, report.cards, report.accepted
        );
        report
    }
}
