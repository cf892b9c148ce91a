//! Period label parsing.
//!
//! Extracts a year and a month from free-text labels such as `"2020 JAN"`,
//! `"Aug-24"` or `"2021-August"`. Both parts are optional; callers decide
//! how to fill a missing year.

use crate::constants::{MONTH_TOKENS, YEAR_PATTERN};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(YEAR_PATTERN).expect("year pattern is a valid regex"));

static MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Longest tokens first so "september" is tried before "sep"
    let mut tokens: Vec<&str> = MONTH_TOKENS.iter().map(|(token, _)| *token).collect();
    tokens.sort_by_key(|token| std::cmp::Reverse(token.len()));
    let pattern = format!(r"(?i)\b({})\b", tokens.join("|"));
    Regex::new(&pattern).expect("month token pattern is a valid regex")
});

/// Year and month recovered from a period label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParsedPeriod {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// Parse a period label into its year and month parts.
///
/// Blank or missing labels yield an empty result.
pub fn parse_period_label(label: Option<&str>) -> ParsedPeriod {
    let Some(label) = label.map(str::trim).filter(|s| !s.is_empty()) else {
        return ParsedPeriod::default();
    };

    ParsedPeriod {
        year: find_year(label),
        month: find_month(label),
    }
}

/// First 19xx/20xx year anywhere in the text
pub fn find_year(text: &str) -> Option<i32> {
    YEAR_RE
        .find(text)
        .and_then(|m| m.as_str().parse::<i32>().ok())
}

/// Month number of the first month token in the text
pub fn find_month(text: &str) -> Option<u32> {
    let token = MONTH_RE.captures(text)?.get(1)?.as_str().to_lowercase();
    month_number(&token)
}

/// Whether the text contains any recognised month token
pub fn contains_month_token(text: &str) -> bool {
    MONTH_RE.is_match(text)
}

/// Look a single token up in the month table
pub fn month_number(token: &str) -> Option<u32> {
    MONTH_TOKENS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(token))
        .map(|(_, month)| *month)
}

/// Year embedded in a file name, ignoring any directory components
pub fn year_from_filename(path: &Path) -> Option<i32> {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| find_year(&name))
}
