//! Command-line front end.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use listing_harvest::config::Settings;
use listing_harvest::search::{SearchQuery, DEFAULT_CATEGORY};
use listing_harvest::sink::{DatasetSink, ListingSink, OutputFormat};
use listing_harvest::summary::RunSummary;
use listing_harvest::{ScrapeError, Scraper};

/// Output file used when `--output` is not given.
const DEFAULT_OUTPUT: &str = "listings.json";

#[derive(Parser)]
#[command(name = "listings")]
#[command(about = "Harvest job and internship listings from paginated listing pages")]
#[command(version)]
pub struct Cli {
    /// Base listing URLs; built from the search filters when omitted
    urls: Vec<String>,

    /// Listing category (e.g. "Accounts", "Web Development")
    #[arg(long)]
    category: Option<String>,

    /// City for on-site listings (implies --on-site)
    #[arg(long)]
    location: Option<String>,

    /// Work-from-home listings (the default search)
    #[arg(long, conflicts_with = "on_site")]
    remote: bool,

    /// On-site listings instead of work-from-home
    #[arg(long)]
    on_site: bool,

    /// Part-time listings only
    #[arg(long)]
    part_time: bool,

    /// Minimum stipend (part-time searches only)
    #[arg(long)]
    stipend: Option<String>,

    /// Maximum number of listings to collect
    #[arg(short = 'n', long)]
    max_results: Option<usize>,

    /// Maximum pages to visit per base URL
    #[arg(long)]
    pages: Option<usize>,

    /// Page fetches in flight at once (0 = all)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Never fall back to browser rendering
    #[arg(long)]
    no_browser: bool,

    /// Output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output formats, comma separated (defaults to the output file's extension).
    /// With several formats each file takes the output path with its own extension.
    #[arg(short, long, value_enum, value_delimiter = ',')]
    format: Vec<OutputFormat>,

    /// Also push results to the configured dataset endpoint
    #[arg(long)]
    dataset: bool,

    /// Config file path (defaults to ./listings.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

impl Cli {
    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(n) = self.max_results {
            settings.scrape.max_results = n;
        }
        if let Some(n) = self.pages {
            settings.scrape.pages_to_scrape = n;
        }
        if let Some(n) = self.concurrency {
            settings.scrape.concurrency = n;
        }
        if self.no_browser {
            settings.render.enabled = false;
        }
    }

    fn search_query(&self) -> SearchQuery {
        SearchQuery {
            category: self
                .category
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            remote: self.remote || !(self.on_site || self.location.is_some()),
            location: self.location.clone(),
            part_time: self.part_time,
            min_stipend: self.stipend.clone(),
        }
    }

    /// File outputs as (format, path) pairs.
    fn outputs(&self) -> Vec<(OutputFormat, PathBuf)> {
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
        match self.format.as_slice() {
            [] => vec![(OutputFormat::from_path(&output), output)],
            [format] => vec![(*format, output)],
            formats => formats
                .iter()
                .map(|format| (*format, output.with_extension(format.extension())))
                .collect(),
        }
    }

    fn base_urls(&self, settings: &Settings) -> Vec<String> {
        if self.urls.is_empty() {
            vec![self.search_query().to_url(&settings.links.origin)]
        } else {
            self.urls.clone()
        }
    }
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut settings);
    settings.validate()?;

    let urls = cli.base_urls(&settings);
    for url in &urls {
        println!("{} Scraping {}", style("→").cyan(), url);
    }

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")?
            .progress_chars("█▓░"),
    );

    let scraper = Scraper::new(&settings)?.with_progress(pb);
    let report = match scraper.run_bases(&urls).await {
        Ok(report) => report,
        Err(ScrapeError::NoResults { pages }) => {
            anyhow::bail!("No listings found across {} page(s)", pages);
        }
        Err(e) => return Err(e.into()),
    };

    let unavailable = report.unavailable_pages();
    if unavailable > 0 {
        println!(
            "{} {} page(s) could not be fetched",
            style("!").yellow(),
            unavailable
        );
    }

    for (format, path) in cli.outputs() {
        format
            .file_sink(&path)
            .write(&report.records)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!(
            "{} Saved {} listings to {}",
            style("✓").green(),
            report.records.len(),
            path.display()
        );
    }

    if cli.dataset {
        let sink = DatasetSink::from_settings(&settings.dataset)?;
        sink.write(&report.records)
            .await
            .with_context(|| format!("failed to write {} output", sink.name()))?;
        println!(
            "{} Pushed {} listings to dataset",
            style("✓").green(),
            report.records.len()
        );
    }
    println!();
    println!("{}", RunSummary::from_records(&report.records));

    Ok(())
}
