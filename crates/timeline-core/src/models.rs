use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TimelineError};
use crate::formatting::format_date;

/// One archived observation of a page: a 14-digit `YYYYMMDDhhmmss`
/// timestamp paired with the similarity fingerprint of its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    /// Capture time as `YYYYMMDDhhmmss`.
    pub timestamp: String,
    /// Opaque fingerprint token. Only compared for equality.
    pub fingerprint: String,
}

impl Capture {
    pub fn new(timestamp: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            fingerprint: fingerprint.into(),
        }
    }
}

/// An ordered, non-empty list of captures.
///
/// Callers supply captures sorted ascending by timestamp; the sequence is
/// never re-sorted. The only way to build one is [`CaptureSequence::new`],
/// which rejects an empty list, so every consumer may rely on `first()` and
/// `last()` being present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CaptureSequence {
    captures: Vec<Capture>,
}

impl CaptureSequence {
    /// Wrap `captures`, failing with [`TimelineError::EmptySequence`] when
    /// the list is empty.
    pub fn new(captures: Vec<Capture>) -> Result<Self> {
        if captures.is_empty() {
            return Err(TimelineError::EmptySequence);
        }
        Ok(Self { captures })
    }

    /// Build a sequence from `(timestamp, fingerprint)` pairs.
    pub fn from_pairs<I, T, F>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (T, F)>,
        T: Into<String>,
        F: Into<String>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(ts, fp)| Capture::new(ts, fp))
                .collect(),
        )
    }

    /// Number of captures (always at least one).
    pub fn len(&self) -> usize {
        self.captures.len()
    }

    /// Always `false`; present for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }

    pub fn first(&self) -> &Capture {
        &self.captures[0]
    }

    pub fn last(&self) -> &Capture {
        &self.captures[self.captures.len() - 1]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Capture> {
        self.captures.iter()
    }

    pub fn as_slice(&self) -> &[Capture] {
        &self.captures
    }
}

impl<'a> IntoIterator for &'a CaptureSequence {
    type Item = &'a Capture;
    type IntoIter = std::slice::Iter<'a, Capture>;

    fn into_iter(self) -> Self::IntoIter {
        self.captures.iter()
    }
}

/// Capture counts for one calendar month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthBucket {
    /// First six characters of the timestamp, `YYYYMM`.
    pub month_key: String,
    /// Captures observed in the month.
    pub total_count: u32,
    /// Captures in the month whose fingerprint differs from the previous capture.
    pub change_count: u32,
}

impl MonthBucket {
    pub fn new(month_key: impl Into<String>) -> Self {
        Self {
            month_key: month_key.into(),
            total_count: 0,
            change_count: 0,
        }
    }
}

/// First and last capture dates, both `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    /// Build a range from two raw timestamps, truncating each to its date.
    pub fn from_timestamps(first: &str, last: &str) -> Self {
        Self {
            start: format_date(first),
            end: format_date(last),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

/// Headline numbers for a capture sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_snapshots: usize,
    pub unique_versions: usize,
    /// `unique_versions / total_snapshots * 100`, rounded to one decimal.
    pub change_frequency_pct: f64,
    pub date_range: DateRange,
}
