//! Turns a listing card into a [`ListingRecord`].

use std::fmt;

use scraper::{ElementRef, Html};
use url::Url;

use super::cascade::{element_text, Cascade, Cleanup};
use super::rules;
use crate::config::LinkSettings;
use crate::error::{Result, ScrapeError};
use crate::models::ListingRecord;

/// Result of extracting one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardOutcome {
    Accepted(ListingRecord),
    Skipped(SkipReason),
}

/// Why a card produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingTitle,
    MissingCompany,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingTitle => write!(f, "no title"),
            SkipReason::MissingCompany => write!(f, "no company"),
        }
    }
}

/// Compiled field cascades plus link resolution.
#[derive(Debug)]
pub struct FieldExtractor {
    title: Cascade,
    company: Cascade,
    location: Cascade,
    duration: Cascade,
    stipend: Cascade,
    experience: Cascade,
    kind: Cascade,
    posted: Cascade,
    logo: Cascade,
    detail_link: Cascade,
    actively_hiring: Cascade,
    early_applicant: Cascade,
    links: LinkBuilder,
}

impl FieldExtractor {
    pub fn new(links: &LinkSettings) -> Result<Self> {
        Ok(Self {
            title: Cascade::compile(rules::TITLE)?,
            company: Cascade::compile(rules::COMPANY)?.with_cleanups(&[Cleanup::ActivelyHiring]),
            location: Cascade::compile(rules::LOCATION)?,
            duration: Cascade::compile(rules::DURATION)?.with_cleanups(&[Cleanup::LabelPrefix]),
            stipend: Cascade::compile(rules::STIPEND)?.with_cleanups(&[Cleanup::LabelPrefix]),
            experience: Cascade::compile(rules::EXPERIENCE)?
                .with_cleanups(&[Cleanup::LabelPrefix, Cleanup::PluralMarker]),
            kind: Cascade::compile(rules::KIND)?,
            posted: Cascade::compile(rules::POSTED)?,
            logo: Cascade::compile(rules::LOGO)?.with_cleanups(&[Cleanup::RootPath]),
            detail_link: Cascade::compile(rules::DETAIL_LINK)?,
            actively_hiring: Cascade::compile(rules::ACTIVELY_HIRING_BADGE)?,
            early_applicant: Cascade::compile(rules::EARLY_APPLICANT_BADGE)?,
            links: LinkBuilder::new(links)?,
        })
    }

    /// Extract a record from one card element.
    pub fn extract(&self, card: ElementRef<'_>) -> CardOutcome {
        let Some(title) = self.title.first(card) else {
            return CardOutcome::Skipped(SkipReason::MissingTitle);
        };
        let Some(company) = self.company.value(card) else {
            return CardOutcome::Skipped(SkipReason::MissingCompany);
        };

        let mut record = ListingRecord::new(title.value, company);
        record.location = self.location.value(card);
        record.duration = self.duration.value(card);
        record.stipend = self.stipend.value(card);
        record.experience = self.experience.value(card);
        record.kind = self.kind.value(card);
        record.posted = self.posted.value(card);
        record.logo_url = self.logo.value(card);

        let href = title.href.or_else(|| self.detail_link.value(card));
        if let Some(job_url) = href.and_then(|h| self.links.absolute(&h)) {
            record.apply_link = Some(self.links.with_referral(&job_url));
            record.job_url = Some(job_url);
        }

        let text = element_text(card).to_lowercase();
        record.actively_hiring =
            self.actively_hiring.any_match(card) || text.contains("actively hiring");
        record.early_applicant =
            self.early_applicant.any_match(card) || text.contains("early applicant");

        CardOutcome::Accepted(record)
    }

    /// Extract a record from a standalone card fragment.
    pub fn extract_fragment(&self, markup: &str) -> CardOutcome {
        let fragment = Html::parse_fragment(markup);
        self.extract(fragment.root_element())
    }
}

/// Resolves card links against the site origin.
#[derive(Debug)]
struct LinkBuilder {
    origin: Url,
    referral_query: String,
}

impl LinkBuilder {
    fn new(settings: &LinkSettings) -> Result<Self> {
        let origin = Url::parse(&settings.origin).map_err(|e| {
            ScrapeError::Config(format!("invalid link origin '{}': {}", settings.origin, e))
        })?;
        Ok(Self {
            origin,
            referral_query: settings.referral_query.clone(),
        })
    }

    fn absolute(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        if href.starts_with("http://") || href.starts_with("https://") {
            return Some(href.to_string());
        }
        self.origin.join(href).ok().map(String::from)
    }

    fn with_referral(&self, url: &str) -> String {
        if self.referral_query.is_empty() {
            return url.to_string();
        }
        match self.referral_query.strip_prefix('?') {
            Some(params) if url.contains('?') => format!("{}&{}", url, params),
            _ => format!("{}{}", url, self.referral_query),
        }
    }
}
