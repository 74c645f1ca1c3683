//! Normalization of the `/simhash` results response.
//!
//! The backend answers in one of three shapes: an error object
//! `{status: "error", info}`, a wrapper object `{captures: [[ts, fp], ...]}`,
//! or a bare `[[ts, fp], ...]` array. [`normalize_capture_response`] folds
//! them into a single [`CaptureFetch`] so nothing past this module sees raw
//! JSON.

use serde_json::Value;

use timeline_core::{Capture, CaptureSequence, Result, TimelineError};

/// Message used when an error object carries no `info` text.
pub const DEFAULT_NO_CAPTURES_INFO: &str = "No captures found for this website and year.";

/// Outcome of a results fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureFetch {
    /// At least one well-formed capture.
    Ok(CaptureSequence),
    /// A recognised or unrecognised shape with no usable captures.
    Empty,
    /// The backend reported an error; carries its message.
    Error(String),
}

impl CaptureFetch {
    /// Convert into the sequence, mapping `Empty` to
    /// [`TimelineError::NoCaptures`] and `Error` to [`TimelineError::Backend`].
    pub fn into_result(self) -> Result<CaptureSequence> {
        match self {
            CaptureFetch::Ok(seq) => Ok(seq),
            CaptureFetch::Empty => Err(TimelineError::NoCaptures),
            CaptureFetch::Error(info) => Err(TimelineError::Backend(info)),
        }
    }
}

/// Fold a decoded results body into a [`CaptureFetch`].
pub fn normalize_capture_response(value: &Value) -> CaptureFetch {
    if let Some(status) = value.get("status").and_then(Value::as_str) {
        if status.eq_ignore_ascii_case("error") {
            let info = value
                .get("info")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_NO_CAPTURES_INFO);
            return CaptureFetch::Error(info.to_string());
        }
    }

    let entries = match value {
        Value::Array(items) if is_capture_pair(items.first()) => items,
        Value::Object(map) => match map.get("captures") {
            Some(Value::Array(items)) => items,
            _ => {
                tracing::debug!("results object has no captures array");
                return CaptureFetch::Empty;
            }
        },
        _ => {
            tracing::debug!("results body has an unrecognised shape");
            return CaptureFetch::Empty;
        }
    };

    let mut captures = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        match decode_capture(entry) {
            Some(capture) => captures.push(capture),
            None => tracing::warn!(index = i, entry = %entry, "skipping malformed capture"),
        }
    }

    match CaptureSequence::new(captures) {
        Ok(seq) => CaptureFetch::Ok(seq),
        Err(_) => CaptureFetch::Empty,
    }
}

/// `true` when `value` is a two-element array.
fn is_capture_pair(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Array(pair)) if pair.len() == 2)
}

/// Decode `[timestamp, fingerprint, ...]`, accepting strings or numbers.
fn decode_capture(entry: &Value) -> Option<Capture> {
    let pair = entry.as_array()?;
    if pair.len() < 2 {
        return None;
    }
    Some(Capture::new(scalar_text(&pair[0])?, scalar_text(&pair[1])?))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
