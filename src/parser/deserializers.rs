use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

// ── Static regex ──────────────────────────────────────────────────────────────

/// "1,234" or "12,345,678.90": commas only between groups of three digits.
static THOUSANDS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?\d{1,3}(,\d{3})+(\.\d+)?$").expect("THOUSANDS_REGEX: invalid pattern")
});

/// Accepted when the configuration does not list its own formats.
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Parse a date or datetime string, keeping only the calendar date.
/// Returns None for empty or unparseable strings.
pub fn parse_date<S: AsRef<str>>(s: &str, formats: &[S]) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    formats.iter().find_map(|fmt| {
        let fmt = fmt.as_ref();
        NaiveDateTime::parse_from_str(trimmed, fmt)
            .map(|dt| dt.date())
            .or_else(|_| NaiveDate::parse_from_str(trimmed, fmt))
            .ok()
    })
}

/// Parse an hours or amount cell ("1,234.50" → 1234.5, "$80" → 80.0).
/// Returns None for empty, non-numeric or non-finite values. A comma is
/// only accepted as a thousands separator: "1,5" is None, not 15.
pub fn parse_number(s: &str) -> Option<f64> {
    let mut cleaned: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '$')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    if cleaned.contains(',') {
        if !THOUSANDS_REGEX.is_match(&cleaned) {
            return None;
        }
        cleaned.retain(|c| c != ',');
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// "" → None, "  Open " → Some("Open")
pub fn parse_opt_string(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
