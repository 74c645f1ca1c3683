//! Target URL normalization and archive links.

use regex::Regex;
use std::sync::OnceLock;

/// Base of the public archive's snapshot viewer.
pub const ARCHIVE_VIEW_BASE: &str = "https://web.archive.org/web";

fn scheme_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^https?://").expect("regex is valid"))
}

fn www_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^www\.").expect("regex is valid"))
}

/// Normalize a user-entered URL before it is submitted.
///
/// Trims whitespace, then strips a leading `http://`/`https://`, then a
/// leading `www.`, then every trailing `/`.
///
/// ```
/// use timeline_core::url::clean_target_url;
///
/// assert_eq!(clean_target_url("  HTTPS://WWW.Example.com/// "), "Example.com");
/// assert_eq!(clean_target_url("example.com/blog/"), "example.com/blog");
/// ```
pub fn clean_target_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_scheme = scheme_re().replace(trimmed, "");
    let without_www = www_re().replace(&without_scheme, "");
    without_www.trim_end_matches('/').to_string()
}

/// Link to the archived copy of `url` captured at `timestamp`.
pub fn archive_url(timestamp: &str, url: &str) -> String {
    format!("{ARCHIVE_VIEW_BASE}/{timestamp}/{url}")
}
