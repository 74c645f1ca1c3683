//! Capture aggregation by calendar month.

use std::collections::HashMap;

use timeline_core::formatting::month_key;
use timeline_core::models::MonthBucket;
use timeline_core::CaptureSequence;

// ── MonthlyTotals ─────────────────────────────────────────────────────────────

/// Counts summed across every bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyTotals {
    pub total_count: u32,
    pub change_count: u32,
    pub months: u32,
}

// ── MonthlyAggregator ─────────────────────────────────────────────────────────

/// Stateless helper that groups captures by `YYYYMM` month key.
pub struct MonthlyAggregator;

impl MonthlyAggregator {
    /// Group `captures` into month buckets in a single pass.
    ///
    /// `changes` is the parallel flag sequence from
    /// [`detect_changes`](crate::changes::detect_changes); a missing flag
    /// counts as unchanged.
    ///
    /// Buckets come back in the order their month was first seen. For sorted
    /// input that is chronological order; unsorted input is not reordered.
    pub fn aggregate(captures: &CaptureSequence, changes: &[bool]) -> Vec<MonthBucket> {
        let mut buckets: Vec<MonthBucket> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (i, capture) in captures.iter().enumerate() {
            let key = month_key(&capture.timestamp);
            let slot = *index.entry(key.clone()).or_insert_with(|| {
                buckets.push(MonthBucket::new(key));
                buckets.len() - 1
            });

            let bucket = &mut buckets[slot];
            bucket.total_count += 1;
            if changes.get(i).copied().unwrap_or(false) {
                bucket.change_count += 1;
            }
        }

        buckets
    }

    /// Sum the counts of every bucket.
    pub fn calculate_totals(buckets: &[MonthBucket]) -> MonthlyTotals {
        let mut totals = MonthlyTotals::default();
        for bucket in buckets {
            totals.total_count += bucket.total_count;
            totals.change_count += bucket.change_count;
            totals.months += 1;
        }
        totals
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
