//! Card location and field extraction.

mod cascade;
mod fields;
mod locator;
pub mod rules;

pub use cascade::{normalize_ws, strip_actively_hiring, Cascade, Cleanup, Hit, RuleSpec, NOT_SPECIFIED};
pub use fields::{CardOutcome, FieldExtractor, SkipReason};
pub use locator::{CardLocator, LocateStrategy, LocatedCards};
