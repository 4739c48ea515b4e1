use chrono::NaiveDate;
use std::collections::HashMap;

use super::summary::DividendSummary;

/// Cache key for a computed dividend summary.
///
/// The JS original keyed its memo on array object identity (WeakMap);
/// here each input set carries a revision counter bumped by the facade
/// whenever the set is replaced or mutated. The as-of date is already
/// day-granular, so it participates directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SummaryCacheKey {
    pub history_rev: u64,
    pub dividends_rev: u64,
    pub inventory_rev: u64,
    pub as_of: NaiveDate,
}

/// Memo of dividend summaries. Safe under re-entrant calls because the
/// engine never mutates incrementally: a call either recomputes from
/// scratch or returns a finished cached value.
#[derive(Debug, Clone, Default)]
pub struct SummaryCache {
    entries: HashMap<SummaryCacheKey, DividendSummary>,
}

impl SummaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &SummaryCacheKey) -> Option<&DividendSummary> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: SummaryCacheKey, summary: DividendSummary) {
        self.entries.insert(key, summary);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every memoized summary (e.g., after bulk imports).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
