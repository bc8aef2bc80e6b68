//! Finds listing cards in a page.

use std::fmt;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::rules::{CARD_SELECTORS, CARD_TEXT_GROUPS};
use crate::error::{Result, ScrapeError};

/// How the cards of a page were found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocateStrategy {
    /// A structural selector matched.
    Selector(String),
    /// No selector matched; blocks were picked by their text.
    TextHeuristic,
    NotFound,
}

impl fmt::Display for LocateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocateStrategy::Selector(css) => write!(f, "selector {}", css),
            LocateStrategy::TextHeuristic => write!(f, "text heuristic"),
            LocateStrategy::NotFound => write!(f, "not found"),
        }
    }
}

/// Cards found in one document, in document order.
#[derive(Debug)]
pub struct LocatedCards<'a> {
    pub cards: Vec<ElementRef<'a>>,
    pub strategy: LocateStrategy,
}

/// Card locator: selector cascade with a text fallback.
#[derive(Debug)]
pub struct CardLocator {
    selectors: Vec<(String, Selector)>,
    blocks: Selector,
}

impl CardLocator {
    /// Locator using the built-in card selectors.
    pub fn new() -> Result<Self> {
        Self::with_selectors(CARD_SELECTORS.iter().copied())
    }

    /// Locator using custom card selectors, most specific first.
    pub fn with_selectors<'s>(selectors: impl IntoIterator<Item = &'s str>) -> Result<Self> {
        let selectors = selectors
            .into_iter()
            .map(|css| parse(css).map(|sel| (css.to_string(), sel)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            selectors,
            blocks: parse("div")?,
        })
    }

    pub fn locate<'a>(&self, document: &'a Html) -> LocatedCards<'a> {
        for (css, selector) in &self.selectors {
            let cards: Vec<_> = document.select(selector).collect();
            if !cards.is_empty() {
                debug!("Found {} cards with selector {}", cards.len(), css);
                return LocatedCards {
                    cards,
                    strategy: LocateStrategy::Selector(css.clone()),
                };
            }
        }

        let cards: Vec<_> = document
            .select(&self.blocks)
            .filter(|block| looks_like_card(*block))
            .collect();

        if cards.is_empty() {
            LocatedCards {
                cards,
                strategy: LocateStrategy::NotFound,
            }
        } else {
            debug!("Found {} cards by text content", cards.len());
            LocatedCards {
                cards,
                strategy: LocateStrategy::TextHeuristic,
            }
        }
    }
}

fn parse(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::InvalidSelector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

fn looks_like_card(block: ElementRef<'_>) -> bool {
    let text = block.text().collect::<String>().to_lowercase();
    CARD_TEXT_GROUPS
        .iter()
        .all(|group| group.iter().any(|token| text.contains(token)))
}
