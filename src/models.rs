//! Core data structures for ledger tidying.
//!
//! Defines the raw wide table, the canonical tidy record, per-file
//! diagnostics and outcomes, and the statistics reported for a run.

use crate::constants::CATEGORY_SEPARATOR;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::PathBuf;

/// A wide ledger table as read from one input file
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Trimmed column names; the first is always the category column
    pub headers: Vec<String>,
    /// One entry per data row, aligned with `headers`
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Headers after the category column
    pub fn value_headers(&self) -> &[String] {
        self.headers.get(1..).unwrap_or(&[])
    }

    /// Cell at a row and absolute column position
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(|c| c.as_deref())
    }
}

/// One (year, month, type, source) observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidyRecord {
    #[serde(rename = "Year")]
    pub year: Option<i32>,
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Source")]
    pub source: Option<String>,
    #[serde(rename = "Amount")]
    pub amount: f64,
}

impl TidyRecord {
    /// Ordering used for tidy output: year, month, type, source with
    /// missing values last.
    pub fn sort_key_cmp(&self, other: &Self) -> Ordering {
        nulls_last(&self.year, &other.year)
            .then(self.month.cmp(&other.month))
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| nulls_last(&self.source, &other.source))
    }
}

fn nulls_last<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Split a `"<Type> - <Source>"` label on its first separator.
///
/// Labels without a separator become a type with no source.
pub fn split_category(category: &str) -> (String, Option<String>) {
    match category.split_once(CATEGORY_SEPARATOR) {
        Some((kind, source)) => (kind.to_string(), Some(source.to_string())),
        None => (category.to_string(), None),
    }
}

/// Why a (category, period) cell produced no record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropReason {
    UnparseableAmount,
    UnparseablePeriod,
    UnparseableAmountAndPeriod,
}

impl DropReason {
    pub fn from_failures(amount_missing: bool, month_missing: bool) -> Option<Self> {
        match (amount_missing, month_missing) {
            (false, false) => None,
            (true, false) => Some(DropReason::UnparseableAmount),
            (false, true) => Some(DropReason::UnparseablePeriod),
            (true, true) => Some(DropReason::UnparseableAmountAndPeriod),
        }
    }
}

/// A cell dropped during tidying
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedCell {
    pub category: String,
    pub period_label: String,
    pub raw_amount: Option<String>,
    pub reason: DropReason,
}

/// Per-file record of what the tidier discarded and how it chose columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileDiagnostics {
    pub dropped: Vec<DroppedCell>,
    pub used_header_fallback: bool,
}

impl FileDiagnostics {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    /// Number of dropped cells with the given reason
    pub fn count_by_reason(&self, reason: DropReason) -> usize {
        self.dropped.iter().filter(|d| d.reason == reason).count()
    }
}

/// Tidy records for one input file, already sorted
#[derive(Debug, Clone, PartialEq)]
pub struct TidyFile {
    pub source_path: PathBuf,
    pub records: Vec<TidyRecord>,
    pub diagnostics: FileDiagnostics,
}

impl TidyFile {
    pub fn row_count(&self) -> usize {
        self.records.len()
    }
}

/// Summary of one tidy file written to disk
#[derive(Debug, Clone, PartialEq)]
pub struct TidyReport {
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    pub rows: usize,
    pub diagnostics: FileDiagnostics,
}

/// What happened to a single input file
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Tidied(TidyReport),
    SkippedEmpty { path: PathBuf },
}

/// Result of concatenating tidy files into the merged dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    pub files_merged: usize,
    pub total_rows: usize,
    pub output_path: PathBuf,
}

/// Processing statistics for a full run
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub files_discovered: usize,
    pub files_tidied: usize,
    pub skipped_files: Vec<PathBuf>,
    pub failed_files: Vec<(PathBuf, String)>,
    pub tidy_outputs: Vec<PathBuf>,
    pub tidy_rows: usize,
    pub dropped_cells: usize,
    pub merged_rows: usize,
    pub merged_output: Option<PathBuf>,
    pub processing_time_ms: u128,
}

impl ProcessingStats {
    pub fn has_failures(&self) -> bool {
        !self.failed_files.is_empty()
    }
}
