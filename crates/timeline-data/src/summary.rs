//! Headline statistics for a capture sequence.

use std::collections::HashSet;

use timeline_core::formatting::percentage;
use timeline_core::models::{DateRange, SummaryStats};
use timeline_core::CaptureSequence;

/// Number of distinct fingerprints across `captures`.
pub fn count_unique_versions<'a, I>(fingerprints: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    fingerprints.into_iter().collect::<HashSet<_>>().len()
}

/// Compute [`SummaryStats`] for `captures`.
///
/// The date range uses the first and last captures in sequence order, not a
/// min/max scan.
pub fn summarize(captures: &CaptureSequence) -> SummaryStats {
    let total_snapshots = captures.len();
    let unique_versions =
        count_unique_versions(captures.iter().map(|c| c.fingerprint.as_str()));

    SummaryStats {
        total_snapshots,
        unique_versions,
        change_frequency_pct: percentage(unique_versions as f64, total_snapshots as f64, 1),
        date_range: DateRange::from_timestamps(
            &captures.first().timestamp,
            &captures.last().timestamp,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(pairs: &[(&str, &str)]) -> CaptureSequence {
        CaptureSequence::from_pairs(pairs.iter().copied()).unwrap()
    }

    #[test]
    fn test_summary_mixed() {
        let stats = summarize(&seq(&[
            ("20200101000000", "A"),
            ("20200115000000", "A"),
            ("20200201000000", "B"),
        ]));
        assert_eq!(stats.total_snapshots, 3);
        assert_eq!(stats.unique_versions, 2);
        assert!((stats.change_frequency_pct - 66.7).abs() < 1e-9);
        assert_eq!(stats.date_range.start, "2020-01-01");
        assert_eq!(stats.date_range.end, "2020-02-01");
    }

    #[test]
    fn test_summary_single_capture() {
        let stats = summarize(&seq(&[("20210601120000", "X")]));
        assert_eq!(stats.total_snapshots, 1);
        assert_eq!(stats.unique_versions, 1);
        assert!((stats.change_frequency_pct - 100.0).abs() < 1e-9);
        assert_eq!(stats.date_range.start, "2021-06-01");
        assert_eq!(stats.date_range.end, "2021-06-01");
    }

    #[test]
    fn test_summary_all_distinct_is_100() {
        let stats = summarize(&seq(&[
            ("20200101000000", "A"),
            ("20200102000000", "B"),
            ("20200103000000", "C"),
            ("20200104000000", "D"),
        ]));
        assert!((stats.change_frequency_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_all_identical_is_minimum() {
        let stats = summarize(&seq(&[
            ("20200101000000", "A"),
            ("20200102000000", "A"),
            ("20200103000000", "A"),
            ("20200104000000", "A"),
        ]));
        assert_eq!(stats.unique_versions, 1);
        assert!((stats.change_frequency_pct - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_change_frequency_rounds_like_fixed_decimal_display() {
        let fingerprints = ["A", "B", "C"];
        let captures = CaptureSequence::from_pairs((0..2000).map(|i| {
            (
                format!("2020{:010}", i),
                fingerprints[if i < 3 { i } else { 0 }].to_string(),
            )
        }))
        .unwrap();

        let stats = summarize(&captures);

        assert_eq!(stats.total_snapshots, 2000);
        assert_eq!(stats.unique_versions, 3);
        assert_eq!(format!("{:.1}", stats.change_frequency_pct), "0.1");
    }

    #[test]
    fn test_change_frequency_exact_tie_rounds_up() {
        // One version across 16 captures is exactly 6.25 %.
        let captures =
            CaptureSequence::from_pairs((0..16).map(|i| (format!("2020{:010}", i), "A"))).unwrap();
        assert_eq!(summarize(&captures).change_frequency_pct, 6.3);
    }

    #[test]
    fn test_unique_versions_ignores_order_and_repetition() {
        let a = summarize(&seq(&[
            ("20200101000000", "A"),
            ("20200102000000", "B"),
            ("20200103000000", "A"),
            ("20200104000000", "C"),
        ]));
        let b = summarize(&seq(&[
            ("20200101000000", "C"),
            ("20200102000000", "C"),
            ("20200103000000", "B"),
            ("20200104000000", "A"),
        ]));
        assert_eq!(a.unique_versions, 3);
        assert_eq!(b.unique_versions, 3);
    }

    #[test]
    fn test_date_range_uses_sequence_order() {
        let stats = summarize(&seq(&[
            ("20201201000000", "A"),
            ("20200101000000", "B"),
        ]));
        assert_eq!(stats.date_range.to_string(), "2020-12-01 - 2020-01-01");
    }

    #[test]
    fn test_count_unique_versions_direct() {
        assert_eq!(count_unique_versions(["a", "b", "a", "c", "b"]), 3);
    }
}
