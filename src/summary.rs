//! Statistics over a finished run's records.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::models::ListingRecord;

/// Number of locations listed in [`RunSummary::top_locations`].
pub const TOP_LOCATIONS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub unique_titles: usize,
    pub unique_companies: usize,
    /// Most frequent locations, most common first; ties by first appearance.
    pub top_locations: Vec<(String, usize)>,
    pub actively_hiring: usize,
}

impl RunSummary {
    pub fn from_records(records: &[ListingRecord]) -> Self {
        let unique_titles = records.iter().map(|r| &r.title).collect::<HashSet<_>>().len();
        let unique_companies = records
            .iter()
            .map(|r| &r.company)
            .collect::<HashSet<_>>()
            .len();

        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        for (index, location) in records.iter().filter_map(|r| r.location.as_deref()).enumerate() {
            counts.entry(location).or_insert((0, index)).0 += 1;
        }
        let mut locations: Vec<_> = counts.into_iter().collect();
        locations.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
        let top_locations = locations
            .into_iter()
            .take(TOP_LOCATIONS)
            .map(|(location, (count, _))| (location.to_string(), count))
            .collect();

        Self {
            total: records.len(),
            unique_titles,
            unique_companies,
            top_locations,
            actively_hiring: records.iter().filter(|r| r.actively_hiring).count(),
        }
    }

    pub fn actively_hiring_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.actively_hiring as f64 / self.total as f64 * 100.0
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Listings:          {}", self.total)?;
        writeln!(f, "Unique roles:      {}", self.unique_titles)?;
        writeln!(f, "Unique companies:  {}", self.unique_companies)?;
        if !self.top_locations.is_empty() {
            let top: Vec<String> = self
                .top_locations
                .iter()
                .map(|(location, count)| format!("{} ({})", location, count))
                .collect();
            writeln!(f, "Top locations:     {}", top.join(", "))?;
        }
        write!(
            f,
            "Actively hiring:   {} ({:.1}%)",
            self.actively_hiring,
            self.actively_hiring_percent()
        )
    }
}
