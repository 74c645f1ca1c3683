//! Main analysis pipeline.
//!
//! Runs change detection, monthly aggregation, summary statistics and row
//! formatting over one capture sequence, returning a [`TimelineAnalysis`]
//! ready for the presentation layer. Nothing is cached between calls.

use chrono::Utc;
use serde::Serialize;

use timeline_core::formatting::month_label;
use timeline_core::models::{MonthBucket, SummaryStats};
use timeline_core::CaptureSequence;

use crate::aggregator::MonthlyAggregator;
use crate::changes::{count_changes, detect_changes};
use crate::summary::summarize;
use crate::table::{build_rows, TableRowData};

// ── Public types ──────────────────────────────────────────────────────────────

/// Two bar series over the month buckets, in bucket order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    /// `YYYY-MM` label per bucket.
    pub labels: Vec<String>,
    /// Captures per bucket ("Total Snapshots").
    pub totals: Vec<u32>,
    /// Change events per bucket ("Content Changes").
    pub changes: Vec<u32>,
}

impl ChartSeries {
    pub fn from_buckets(buckets: &[MonthBucket]) -> Self {
        Self {
            labels: buckets.iter().map(|b| month_label(&b.month_key)).collect(),
            totals: buckets.iter().map(|b| b.total_count).collect(),
            changes: buckets.iter().map(|b| b.change_count).collect(),
        }
    }
}

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    pub captures_processed: usize,
    pub buckets_created: usize,
    pub change_events: usize,
    /// Wall-clock seconds spent deriving the result.
    pub transform_time_seconds: f64,
}

/// The complete output of [`analyze_timeline`].
#[derive(Debug, Clone)]
pub struct TimelineAnalysis {
    pub captures: CaptureSequence,
    /// One flag per capture; see [`detect_changes`].
    pub changes: Vec<bool>,
    pub buckets: Vec<MonthBucket>,
    pub summary: SummaryStats,
    pub rows: Vec<TableRowData>,
    pub chart: ChartSeries,
    pub metadata: AnalysisMetadata,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full analysis pipeline over `captures`.
///
/// `url` is the cleaned target URL, used for each row's archive link.
pub fn analyze_timeline(captures: CaptureSequence, url: &str) -> TimelineAnalysis {
    let start = std::time::Instant::now();

    let changes = detect_changes(&captures);
    let buckets = MonthlyAggregator::aggregate(&captures, &changes);
    let summary = summarize(&captures);
    let rows = build_rows(&captures, &changes, url);
    let chart = ChartSeries::from_buckets(&buckets);

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        captures_processed: captures.len(),
        buckets_created: buckets.len(),
        change_events: count_changes(&changes),
        transform_time_seconds: start.elapsed().as_secs_f64(),
    };

    tracing::info!(
        captures = metadata.captures_processed,
        unique_versions = summary.unique_versions,
        months = metadata.buckets_created,
        changes = metadata.change_events,
        "timeline analysed"
    );

    TimelineAnalysis {
        captures,
        changes,
        buckets,
        summary,
        rows,
        chart,
        metadata,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
