//! Data models for listing harvesting.

mod listing;

pub use listing::{Fingerprint, ListingRecord};
