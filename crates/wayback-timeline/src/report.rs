//! Plain-text rendering of a finished analysis for the terminal.

use std::fmt::Write as _;

use timeline_core::formatting::format_number;
use timeline_core::models::SummaryStats;
use timeline_data::analysis::ChartSeries;
use timeline_data::table::TableRowData;

/// Width in columns of the longest chart bar.
const CHART_WIDTH: usize = 40;

pub fn render_summary(stats: &SummaryStats, url: &str, year: u16) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Results for {url} ({year})");
    let _ = writeln!(
        out,
        "  Total Snapshots:  {}",
        format_number(stats.total_snapshots as f64, 0)
    );
    let _ = writeln!(
        out,
        "  Unique Versions:  {}",
        format_number(stats.unique_versions as f64, 0)
    );
    let _ = writeln!(out, "  Change Frequency: {:.1}%", stats.change_frequency_pct);
    let _ = writeln!(out, "  Date Range:       {}", stats.date_range);
    out
}

/// One line per month with a bar for total snapshots (`█`) and content
/// changes (`▒`), scaled to the busiest month.
pub fn render_chart(chart: &ChartSeries) -> String {
    let peak = chart.totals.iter().copied().max().unwrap_or(0).max(1);
    let scale = |n: u32| ((n as f64 / peak as f64) * CHART_WIDTH as f64).round() as usize;

    let mut out = String::from("Monthly activity (\u{2588} Total Snapshots, \u{2592} Content Changes)\n");
    for ((label, &total), &changes) in chart.labels.iter().zip(&chart.totals).zip(&chart.changes) {
        let _ = writeln!(
            out,
            "  {label}  {:<width$} {total:>4}",
            "\u{2588}".repeat(scale(total)),
            width = CHART_WIDTH
        );
        let _ = writeln!(
            out,
            "           {:<width$} {changes:>4}",
            "\u{2592}".repeat(scale(changes)),
            width = CHART_WIDTH
        );
    }
    out
}

/// Capture table. `limit` of 0 prints every row; otherwise the first
/// `limit` rows are printed followed by a count of the rest.
pub fn render_table(rows: &[TableRowData], limit: usize) -> String {
    let shown = if limit == 0 { rows.len() } else { limit.min(rows.len()) };
    let ts_width = rows
        .iter()
        .take(shown)
        .map(|r| r.raw_timestamp.chars().count())
        .max()
        .unwrap_or(0)
        .max("Timestamp".len());
    let fp_width = rows
        .iter()
        .take(shown)
        .map(|r| r.fingerprint.chars().count())
        .max()
        .unwrap_or(0)
        .max("Simhash".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5}  {:<ts_width$}  {:<19}  {:<fp_width$}  {:<7}  View",
        "#", "Timestamp", "Date & Time", "Simhash", "Status"
    );
    for row in &rows[..shown] {
        let _ = writeln!(
            out,
            "{:>5}  {:<ts_width$}  {:<19}  {:<fp_width$}  {:<7}  {}",
            row.position,
            row.raw_timestamp,
            row.formatted_date_time,
            row.fingerprint,
            row.changed_label,
            row.archive_url
        );
    }
    if shown < rows.len() {
        let _ = writeln!(out, "  ... {} more captures", rows.len() - shown);
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use timeline_core::CaptureSequence;
    use timeline_data::analysis::analyze_timeline;

    fn analysis() -> timeline_data::analysis::TimelineAnalysis {
        let captures = CaptureSequence::from_pairs([
            ("20200105000000", "A"),
            ("20200120000000", "A"),
            ("20200210000000", "B"),
            ("20200215000000", "C"),
        ])
        .unwrap();
        analyze_timeline(captures, "example.com")
    }

    #[test]
    fn test_render_summary() {
        let a = analysis();
        let text = render_summary(&a.summary, "example.com", 2020);
        assert!(text.starts_with("Results for example.com (2020)"));
        assert!(text.contains("Total Snapshots:  4"));
        assert!(text.contains("Unique Versions:  3"));
        assert!(text.contains("Change Frequency: 75.0%"));
        assert!(text.contains("Date Range:       2020-01-05 - 2020-02-15"));
    }

    #[test]
    fn test_render_chart_has_a_line_pair_per_month() {
        let a = analysis();
        let text = render_chart(&a.chart);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1 + 2 * 2);
        assert!(lines[1].contains("2020-01"));
        assert!(lines[3].contains("2020-02"));
        // Both months hold two captures, so both total bars are full width.
        assert_eq!(lines[1].matches('\u{2588}').count(), CHART_WIDTH);
        assert_eq!(lines[3].matches('\u{2588}').count(), CHART_WIDTH);
        // January has no changes; February has two.
        assert_eq!(lines[2].matches('\u{2592}').count(), 0);
        assert_eq!(lines[4].matches('\u{2592}').count(), CHART_WIDTH);
    }

    #[test]
    fn test_render_table_all_rows() {
        let a = analysis();
        let text = render_table(&a.rows, 0);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("    #  Timestamp       Date & Time"));
        assert!(lines[1].starts_with("    1  20200105000000  2020-01-05 00:00:00"));
        assert!(lines[1].contains("Same"));
        assert!(lines[3].contains("Changed"));
        assert!(lines[3].ends_with("https://web.archive.org/web/20200210000000/example.com"));
    }

    #[test]
    fn test_render_table_truncates() {
        let a = analysis();
        let text = render_table(&a.rows, 2);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3], "  ... 2 more captures");
    }
}
