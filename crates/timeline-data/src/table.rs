//! Display rows for the capture table.

use serde::Serialize;

use timeline_core::formatting::format_date_time;
use timeline_core::url::archive_url;
use timeline_core::CaptureSequence;

/// Label shown for a capture whose fingerprint differs from the previous one.
pub const CHANGED_LABEL: &str = "Changed";
/// Label shown for every other capture.
pub const SAME_LABEL: &str = "Same";

/// Label for a change flag.
pub fn change_label(changed: bool) -> &'static str {
    if changed {
        CHANGED_LABEL
    } else {
        SAME_LABEL
    }
}

/// Data for a single row in the capture table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRowData {
    /// 1-based position in the sequence.
    pub position: usize,
    /// Timestamp exactly as received.
    pub raw_timestamp: String,
    /// `YYYY-MM-DD hh:mm:ss`.
    pub formatted_date_time: String,
    pub fingerprint: String,
    /// `Changed` or `Same`.
    pub changed_label: &'static str,
    /// Link to the archived copy of this capture.
    pub archive_url: String,
}

/// Build one row per capture.
///
/// `changes` is the parallel flag sequence; a missing flag renders as `Same`.
pub fn build_rows(captures: &CaptureSequence, changes: &[bool], url: &str) -> Vec<TableRowData> {
    captures
        .iter()
        .enumerate()
        .map(|(i, capture)| TableRowData {
            position: i + 1,
            raw_timestamp: capture.timestamp.clone(),
            formatted_date_time: format_date_time(&capture.timestamp),
            fingerprint: capture.fingerprint.clone(),
            changed_label: change_label(changes.get(i).copied().unwrap_or(false)),
            archive_url: archive_url(&capture.timestamp, url),
        })
        .collect()
}

// ── Tests ──────────────────────────────────────────────────────────────────────
