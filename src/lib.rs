//! listing-harvest - resilient extraction of job and internship listings.
//!
//! Pages are planned from a base URL, fetched over plain HTTP with a
//! headless-browser fallback, split into listing cards with a selector
//! cascade, and turned into deduplicated [`ListingRecord`]s capped at a
//! configured result count.

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod normalize;
pub mod planner;
pub mod search;
pub mod sink;
pub mod summary;

pub use aggregate::{Admission, Aggregator};
pub use config::Settings;
pub use engine::{ScrapeReport, Scraper};
pub use error::{FetchError, RenderError, ScrapeError};
pub use extract::{CardLocator, CardOutcome, FieldExtractor};
pub use fetch::{FetchOutcome, FetchStrategy};
pub use models::{Fingerprint, ListingRecord};
pub use planner::PagePlan;
