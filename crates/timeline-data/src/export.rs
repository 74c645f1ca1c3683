//! CSV and JSON export of a capture sequence.
//!
//! Both formats reproduce the established download layout byte for byte.
//! The CSV writer only wraps the date-time and fingerprint columns in quotes
//! and never escapes embedded commas or quotes; the JSON document carries no
//! change flag. Consumers depend on both shapes as they are.

use serde::{Deserialize, Serialize};

use timeline_core::formatting::format_date_time;
use timeline_core::CaptureSequence;

use crate::summary::count_unique_versions;
use crate::table::change_label;

/// Header line of the CSV export.
pub const CSV_HEADER: &str = "Timestamp,Date & Time,Simhash,Status";

/// The two downloadable export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    /// MIME type of the exported document.
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
        }
    }
}

/// `<url>-<year>-results.<ext>`.
pub fn export_file_name(url: &str, year: u16, format: ExportFormat) -> String {
    format!("{}-{}-results.{}", url, year, format.extension())
}

/// Render the CSV export: the header, then one line per capture, every line
/// terminated by `\n`.
pub fn to_csv(captures: &CaptureSequence, changes: &[bool]) -> String {
    let mut csv = String::with_capacity(CSV_HEADER.len() + 1 + captures.len() * 64);
    csv.push_str(CSV_HEADER);
    csv.push('\n');

    for (i, capture) in captures.iter().enumerate() {
        let status = change_label(changes.get(i).copied().unwrap_or(false));
        csv.push_str(&format!(
            "{},\"{}\",\"{}\",{}\n",
            capture.timestamp,
            format_date_time(&capture.timestamp),
            capture.fingerprint,
            status
        ));
    }

    csv
}

/// One capture inside the JSON export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonCapture {
    /// 1-based position.
    pub index: usize,
    pub timestamp: String,
    pub datetime: String,
    pub simhash: String,
}

/// Top-level JSON export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonExport {
    pub url: String,
    /// Emitted as a string, the way the year was entered.
    pub year: String,
    pub total_snapshots: usize,
    pub unique_versions: usize,
    pub captures: Vec<JsonCapture>,
}

impl JsonExport {
    pub fn build(captures: &CaptureSequence, url: &str, year: u16) -> Self {
        Self {
            url: url.to_string(),
            year: year.to_string(),
            total_snapshots: captures.len(),
            unique_versions: count_unique_versions(
                captures.iter().map(|c| c.fingerprint.as_str()),
            ),
            captures: captures
                .iter()
                .enumerate()
                .map(|(i, c)| JsonCapture {
                    index: i + 1,
                    timestamp: c.timestamp.clone(),
                    datetime: format_date_time(&c.timestamp),
                    simhash: c.fingerprint.clone(),
                })
                .collect(),
        }
    }
}

/// Render the JSON export, pretty-printed with two-space indentation.
pub fn to_json(
    captures: &CaptureSequence,
    url: &str,
    year: u16,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonExport::build(captures, url, year))
}
