//! Application constants for the ledger tidier
//!
//! Token tables, column names and directory layout defaults shared by the
//! parsers, the tidier and the merger.

// =============================================================================
// Period Recognition
// =============================================================================

/// Month names and abbreviations recognised in period labels.
///
/// Matching is case-insensitive and word-bounded, so `"2020-Jan"` and
/// `"JAN 2020"` both resolve while `"January2020"` does not.
pub const MONTH_TOKENS: &[(&str, u32)] = &[
    ("jan", 1),
    ("january", 1),
    ("feb", 2),
    ("february", 2),
    ("mar", 3),
    ("march", 3),
    ("apr", 4),
    ("april", 4),
    ("may", 5),
    ("jun", 6),
    ("june", 6),
    ("jul", 7),
    ("july", 7),
    ("aug", 8),
    ("august", 8),
    ("sep", 9),
    ("sept", 9),
    ("september", 9),
    ("oct", 10),
    ("october", 10),
    ("nov", 11),
    ("november", 11),
    ("dec", 12),
    ("december", 12),
];

/// Four digit years in 1900-2099. Not word-bounded.
pub const YEAR_PATTERN: &str = r"(19|20)\d{2}";

/// Header texts that never count as a period column, compared trimmed and lowercased
pub const NON_PERIOD_HEADERS: &[&str] = &["total", "totals", "grand total"];

// =============================================================================
// Category Labels
// =============================================================================

/// Name given to the first raw column regardless of its original header
pub const CATEGORY_COLUMN: &str = "Category";

/// Separator between type and source in `"<Type> - <Source>"` labels
pub const CATEGORY_SEPARATOR: &str = " - ";

// =============================================================================
// Tidy Schema
// =============================================================================

pub mod columns {
    pub const YEAR: &str = "Year";
    pub const MONTH: &str = "Month";
    pub const TYPE: &str = "Type";
    pub const SOURCE: &str = "Source";
    pub const AMOUNT: &str = "Amount";

    /// Fixed output column order
    pub const ALL: [&str; 5] = [YEAR, MONTH, TYPE, SOURCE, AMOUNT];
}

// =============================================================================
// File Layout
// =============================================================================

/// Extension of eligible raw input files (case sensitive)
pub const RAW_FILE_EXTENSION: &str = "csv";

/// Suffix appended to the raw file stem for per-file tidy output
pub const TIDY_FILE_SUFFIX: &str = "_tidy.csv";

/// Pattern used to rediscover tidy outputs for merge-only runs
pub const TIDY_FILE_PATTERN: &str = "*_tidy.csv";

/// Directories relative to the project root
pub const RAW_DIR: &[&str] = &["data", "raw"];
pub const TIDY_DIR: &[&str] = &["data", "tidy"];
pub const PROCESSED_DIR: &[&str] = &["data", "processed"];

/// Merged dataset file name inside the processed directory
pub const MERGED_FILE_NAME: &str = "all_years_data.parquet";

/// Upper bound on the default number of files tidied concurrently
pub const MAX_DEFAULT_CONCURRENCY: usize = 8;
