//! Lenient input normalization
//!
//! Agents and shells hand us loosely typed values: booleans as `"true"`,
//! integers as `"null"`, URL lists as a single JSON-looking string. Everything
//! here turns those into typed values and never fails; unusable input falls
//! back to the documented default.

use serde::{Deserialize, Serialize};

/// Time range filter for search results
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Day,
    Month,
    Year,
}

impl TimeRange {
    /// Get the string representation for API calls
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Parse a time range; anything unrecognised means "no filter"
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" | "d" => Some(Self::Day),
            "month" | "m" => Some(Self::Month),
            "year" | "y" => Some(Self::Year),
            _ => None,
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalize an optional time range value
pub fn normalize_time_range(value: Option<&str>) -> Option<TimeRange> {
    value.and_then(TimeRange::parse)
}

/// Normalize a boolean flag given as text; only `true` (any case) is true
pub fn parse_flag(value: Option<&str>) -> bool {
    value
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Normalize a result limit given as text
///
/// Missing, `null`, non-numeric and non-positive values all map to `default`.
pub fn parse_max_results(value: Option<&str>, default: usize) -> usize {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map(|n| clamp_max_results(n, default))
        .unwrap_or(default)
}

/// Clamp a signed limit: anything below 1 becomes `default`
pub fn clamp_max_results(value: i64, default: usize) -> usize {
    if value <= 0 {
        default
    } else {
        usize::try_from(value).unwrap_or(default)
    }
}

/// Turn a loosely formatted URL argument into an ordered list
///
/// A plain URL is a one-element list. A string that looks like a serialized
/// list (`["a", "b"]` or `[a, b]`) is parsed as JSON first and, failing
/// that, split on commas with quotes stripped. Blank entries are dropped.
pub fn parse_url_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if !(trimmed.starts_with('[') && trimmed.ends_with(']')) {
        return if trimmed.is_empty() {
            Vec::new()
        } else {
            vec![trimmed.to_string()]
        };
    }

    if let Ok(list) = serde_json::from_str::<Vec<String>>(trimmed) {
        return clean_urls(list);
    }

    let inner = &trimmed[1..trimmed.len() - 1];
    clean_urls(
        inner
            .split(',')
            .map(|part| part.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
            .collect(),
    )
}

/// Trim every URL and drop blank ones, preserving order
pub fn clean_urls(urls: Vec<String>) -> Vec<String> {
    urls.into_iter()
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .collect()
}
