//! Final cleanup of accepted records.

use crate::extract::strip_actively_hiring;
use crate::models::ListingRecord;

/// Strip leftover "Actively hiring" text from company names and sort by
/// company, keeping the relative order of equal companies.
pub fn normalize_results(mut records: Vec<ListingRecord>) -> Vec<ListingRecord> {
    for record in &mut records {
        let company = strip_actively_hiring(&record.company);
        if !company.is_empty() {
            record.company = company;
        }
    }
    records.sort_by(|a, b| a.company.cmp(&b.company));
    records
}
