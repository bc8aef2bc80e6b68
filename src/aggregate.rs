//! Run-wide deduplication and result cap.

use std::collections::HashSet;
use std::sync::Mutex;

use tracing::debug;

use crate::models::{Fingerprint, ListingRecord};

/// What happened to a record offered to the [`Aggregator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    Duplicate,
    CapReached,
}

#[derive(Default)]
struct State {
    records: Vec<ListingRecord>,
    seen: HashSet<Fingerprint>,
}

/// Accepted records for one run, deduplicated by fingerprint and capped.
///
/// Shared by every page task; all mutation goes through one mutex so the
/// count can never exceed `max_results`.
pub struct Aggregator {
    max_results: usize,
    state: Mutex<State>,
}

impl Aggregator {
    pub fn new(max_results: usize) -> Self {
        Self {
            max_results,
            state: Mutex::new(State::default()),
        }
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Offer a record. Accepted records keep insertion order.
    pub fn admit(&self, record: ListingRecord) -> Admission {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        if state.records.len() >= self.max_results {
            return Admission::CapReached;
        }

        let fingerprint = record.fingerprint();
        if !state.seen.insert(fingerprint) {
            debug!(
                "Duplicate listing skipped: {} at {}",
                record.title, record.company
            );
            return Admission::Duplicate;
        }

        state.records.push(record);
        Admission::Accepted
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.max_results
    }

    pub fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .records
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consume the aggregator, returning accepted records in insertion order.
    pub fn into_records(self) -> Vec<ListingRecord> {
        self.state
            .into_inner()
            .unwrap_or_else(|e| e.into_inner())
            .records
    }
}
