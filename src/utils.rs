//! Utility functions for identifiers, URL normalization, and text cleanup.
//!
//! This module provides helper functions used by both scrapers:
//! - Stable article ids derived from links
//! - Normalization of protocol-relative, root-relative and bare links
//! - Whitespace collapsing, byline stripping and char-safe truncation
//! - Timestamps in the format the dashboard expects

use chrono::{SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Trailing byline metadata that Space.com renders inside listing cards,
/// e.g. `"... By Jane Doe last updated 3 hours ago"`.
static BYLINE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)By\s+.*?last updated.*$").expect("byline regex is valid"));

/// Derive a stable article id from its link.
///
/// The id is the percent-encoding of the link, so the same link always maps to
/// the same id and distinct links never collide.
///
/// # Arguments
///
/// * `link` - The absolute article URL
///
/// # Returns
///
/// The percent-encoded link, safe to use in URLs and as a map key.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(article_id("https://a.b/c"), "https%3A%2F%2Fa.b%2Fc");
/// ```
pub fn article_id(link: &str) -> String {
    urlencoding::encode(link).into_owned()
}

/// Turn a link or image source found in a page into an absolute URL.
///
/// - `//host/path` becomes `https://host/path`
/// - `/path` becomes `<origin>/path`
/// - `http://…` and `https://…` are returned unchanged
/// - anything else is treated as a path below the origin
///
/// # Arguments
///
/// * `origin` - Scheme and host of the page the value was found on
/// * `raw` - The `href` or image source as written in the markup
///
/// # Returns
///
/// An absolute URL. The value is not validated beyond its prefix.
pub fn normalize_url(origin: &str, raw: &str) -> String {
    let raw = raw.trim();
    let origin = origin.trim_end_matches('/');

    if let Some(rest) = raw.strip_prefix("//") {
        format!("https://{rest}")
    } else if raw.starts_with('/') {
        format!("{origin}{raw}")
    } else if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("{origin}/{raw}")
    }
}

/// Collapse every run of whitespace into a single space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Clean a headline scraped from a listing card.
///
/// Collapses whitespace and strips a trailing `By … last updated …` byline.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(clean_title("Moon  landing By Jo last updated now"), "Moon landing");
/// ```
pub fn clean_title(raw: &str) -> String {
    let collapsed = collapse_whitespace(raw);
    BYLINE_SUFFIX.replace(&collapsed, "").trim().to_string()
}

/// Keep at most `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and the number of
/// dropped bytes appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…(+{} bytes)", &s[..idx], s.len() - idx),
        None => s.to_string(),
    }
}

/// Current time as an RFC 3339 UTC timestamp with millisecond precision.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
