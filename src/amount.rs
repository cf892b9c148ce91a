//! Monetary amount parsing for hand-edited ledger cells.
//!
//! Accepts currency symbols, thousands separators, stray whitespace and
//! accounting-style parentheses. Anything that does not reduce to a plain
//! number yields `None` rather than an error.

/// Parse a raw amount cell into a signed value.
///
/// Characters other than ASCII digits, `.` and `-` are stripped without
/// further validation, so `"12abc34"` reads as `1234.0` while `"1.2.3"`
/// fails to parse and yields `None`.
pub fn parse_amount(raw: Option<&str>) -> Option<f64> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }

    let (negative, body) = match trimmed
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
    {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };

    let cleaned: String = body
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    if matches!(cleaned.as_str(), "" | "." | "-") {
        return None;
    }

    let value = cleaned.parse::<f64>().ok()?;
    Some(if negative { -value } else { value })
}
