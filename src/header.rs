//! Header classification for wide ledger tables.
//!
//! Decides which non-category columns hold calendar periods. Summary
//! columns such as "Total" are excluded, and tables whose headers carry
//! no month names at all fall back to treating every column as a period.

use crate::constants::NON_PERIOD_HEADERS;
use crate::period::contains_month_token;
use tracing::debug;

/// Period columns chosen from a header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodColumns {
    /// Positions within the headers passed to [`classify_headers`]
    pub indices: Vec<usize>,
    /// True when no header looked like a period and every column was kept
    pub used_fallback: bool,
}

impl PeriodColumns {
    /// Header texts for the selected columns
    pub fn headers<'a>(&self, headers: &'a [String]) -> Vec<&'a str> {
        self.indices
            .iter()
            .filter_map(|&i| headers.get(i).map(String::as_str))
            .collect()
    }
}

/// Classify headers (category column excluded) into period columns.
pub fn classify_headers(headers: &[String]) -> PeriodColumns {
    let indices: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, header)| is_period_header(header))
        .map(|(i, _)| i)
        .collect();

    if !indices.is_empty() {
        return PeriodColumns {
            indices,
            used_fallback: false,
        };
    }

    // No month names anywhere: every column is a period, totals included
    debug!(
        "No month-like headers among {} columns, treating all as periods",
        headers.len()
    );
    PeriodColumns {
        indices: (0..headers.len()).collect(),
        used_fallback: true,
    }
}

/// A header qualifies when it names a month and is not a summary column
fn is_period_header(header: &str) -> bool {
    contains_month_token(header) && !is_summary_header(header)
}

fn is_summary_header(header: &str) -> bool {
    let normalized = header.trim().to_lowercase();
    NON_PERIOD_HEADERS.contains(&normalized.as_str())
}
