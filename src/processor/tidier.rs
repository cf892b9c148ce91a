//! Per-file tidying for wide ledger exports
//!
//! Reshapes one raw table into sorted tidy records: classify period
//! columns, melt every (category, period) cell, parse amount and period,
//! fill missing years from the file name, and drop cells that cannot
//! become a valid record.

use crate::amount::parse_amount;
use crate::constants::TIDY_FILE_SUFFIX;
use crate::error::Result;
use crate::header::classify_headers;
use crate::models::{
    DropReason, DroppedCell, FileDiagnostics, FileOutcome, RawTable, TidyFile, TidyRecord,
    TidyReport, split_category,
};
use crate::period::{parse_period_label, year_from_filename};
use crate::schema::{parse_raw_table, write_tidy_csv};

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Converts raw ledger files into tidy CSV files
#[derive(Debug, Clone)]
pub struct CsvTidier {
    tidy_dir: PathBuf,
}

impl CsvTidier {
    /// Create a tidier writing into `tidy_dir`
    pub fn new(tidy_dir: PathBuf) -> Self {
        Self { tidy_dir }
    }

    /// Output path for a raw file: `<stem>_tidy.csv` in the tidy directory
    pub fn output_path_for(&self, raw_path: &Path) -> PathBuf {
        let stem = raw_path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy();
        self.tidy_dir.join(format!("{}{}", stem, TIDY_FILE_SUFFIX))
    }

    /// Read, tidy and write one raw file.
    ///
    /// Files without data rows are skipped and nothing is written for them.
    pub fn tidy_file(&self, raw_path: &Path) -> Result<FileOutcome> {
        debug!("Tidying file: {}", raw_path.display());

        let bytes = std::fs::read(raw_path)?;
        let table = match parse_raw_table(&bytes)? {
            Some(table) if !table.is_empty() => table,
            _ => {
                warn!("Skipped empty file: {}", raw_path.display());
                return Ok(FileOutcome::SkippedEmpty {
                    path: raw_path.to_path_buf(),
                });
            }
        };

        let tidy = tidy_table(&table, raw_path);
        let output_path = self.output_path_for(raw_path);
        write_tidy_csv(&tidy.records, &output_path)?;

        debug!(
            "Saved tidy file: {} ({} rows, {} cells dropped)",
            output_path.display(),
            tidy.row_count(),
            tidy.diagnostics.dropped_count()
        );

        Ok(FileOutcome::Tidied(TidyReport {
            source_path: tidy.source_path,
            output_path,
            rows: tidy.records.len(),
            diagnostics: tidy.diagnostics,
        }))
    }
}

/// Reshape a wide table into sorted tidy records.
///
/// `source_path` only supplies the fallback year; the table is not
/// modified.
pub fn tidy_table(table: &RawTable, source_path: &Path) -> TidyFile {
    let period_columns = classify_headers(table.value_headers());
    let filename_year = year_from_filename(source_path);

    let mut records = Vec::new();
    let mut diagnostics = FileDiagnostics {
        dropped: Vec::new(),
        used_header_fallback: period_columns.used_fallback,
    };

    // Column-major, so ties in the sort keep period-column order first
    for &value_index in &period_columns.indices {
        let column = value_index + 1;
        let period_label = table.headers[column].as_str();
        let period = parse_period_label(Some(period_label));

        for row in 0..table.rows.len() {
            let category = table.cell(row, 0).unwrap_or_default();
            let raw_amount = table.cell(row, column);
            let amount = parse_amount(raw_amount);

            let (Some(amount), Some(month)) = (amount, period.month) else {
                if let Some(reason) =
                    DropReason::from_failures(amount.is_none(), period.month.is_none())
                {
                    diagnostics.dropped.push(DroppedCell {
                        category: category.to_string(),
                        period_label: period_label.to_string(),
                        raw_amount: raw_amount.map(str::to_string),
                        reason,
                    });
                }
                continue;
            };

            let (kind, source) = split_category(category);
            records.push(TidyRecord {
                year: period.year.or(filename_year),
                month,
                kind,
                source,
                amount,
            });
        }
    }

    // Vec::sort_by is stable
    records.sort_by(TidyRecord::sort_key_cmp);

    TidyFile {
        source_path: source_path.to_path_buf(),
        records,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{frame_to_records, read_tidy_csv};
    use std::fs;
    use tempfile::TempDir;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|c| (!c.is_empty()).then(|| c.to_string()))
                        .collect()
                })
                .collect(),
        }
    }

    fn row(records: &[TidyRecord], i: usize) -> (Option<i32>, u32, &str, Option<&str>, f64) {
        let r = &records[i];
        (r.year, r.month, r.kind.as_str(), r.source.as_deref(), r.amount)
    }

    #[test]
    fn test_budget_scenario() {
        let raw = table(
            &["Category", "Jan", "Feb", "Total"],
            &[
                &["Income - Salary", "1000", "1000", "2000"],
                &["Expense - Rent", "-500", "(500)", "1000"],
            ],
        );
        let tidy = tidy_table(&raw, Path::new("2023_budget.csv"));

        assert_eq!(tidy.row_count(), 4);
        assert_eq!(row(&tidy.records, 0), (Some(2023), 1, "Expense", Some("Rent"), -500.0));
        assert_eq!(row(&tidy.records, 1), (Some(2023), 1, "Income", Some("Salary"), 1000.0));
        assert_eq!(row(&tidy.records, 2), (Some(2023), 2, "Expense", Some("Rent"), -500.0));
        assert_eq!(row(&tidy.records, 3), (Some(2023), 2, "Income", Some("Salary"), 1000.0));
        assert!(!tidy.diagnostics.used_header_fallback);
        assert_eq!(tidy.diagnostics.dropped_count(), 0);
    }

    #[test]
    fn test_label_year_beats_filename_year() {
        let raw = table(&["Item", "2021-Mar", "Apr"], &[&["Income - Bonus", "10", "20"]]);
        let tidy = tidy_table(&raw, Path::new("export_2019.csv"));

        assert_eq!(row(&tidy.records, 0), (Some(2019), 4, "Income", Some("Bonus"), 20.0));
        assert_eq!(row(&tidy.records, 1), (Some(2021), 3, "Income", Some("Bonus"), 10.0));
    }

    #[test]
    fn test_year_stays_missing_without_any_source() {
        let raw = table(&["Category", "Jan"], &[&["Misc", "5"]]);
        let tidy = tidy_table(&raw, Path::new("ledger.csv"));

        assert_eq!(row(&tidy.records, 0), (None, 1, "Misc", None, 5.0));
    }

    #[test]
    fn test_dropped_cells_are_diagnosed() {
        let raw = table(
            &["Category", "Jan", "Feb"],
            &[
                &["Income - Salary", "", "n/a"],
                &["Expense - Rent", "-", "300"],
            ],
        );
        let tidy = tidy_table(&raw, Path::new("2022.csv"));

        assert_eq!(tidy.row_count(), 1);
        assert_eq!(tidy.diagnostics.dropped_count(), 3);
        assert_eq!(
            tidy.diagnostics.count_by_reason(DropReason::UnparseableAmount),
            3
        );
        let first = &tidy.diagnostics.dropped[0];
        assert_eq!(first.category, "Income - Salary");
        assert_eq!(first.period_label, "Jan");
        assert_eq!(first.raw_amount, None);
    }

    #[test]
    fn test_fallback_columns_without_months_drop_everything() {
        let raw = table(&["Category", "Q1", "Q2"], &[&["Income - Salary", "1", ""]]);
        let tidy = tidy_table(&raw, Path::new("2020.csv"));

        assert!(tidy.records.is_empty());
        assert!(tidy.diagnostics.used_header_fallback);
        assert_eq!(
            tidy.diagnostics.count_by_reason(DropReason::UnparseablePeriod),
            1
        );
        assert_eq!(
            tidy.diagnostics
                .count_by_reason(DropReason::UnparseableAmountAndPeriod),
            1
        );
    }

    #[test]
    fn test_ties_keep_melt_order() {
        let raw = table(
            &["Category", "Jan", "January"],
            &[&["Expense - Food", "1", "2"], &["Expense - Food", "3", "4"]],
        );
        let tidy = tidy_table(&raw, Path::new("2024.csv"));

        let amounts: Vec<f64> = tidy.records.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![1.0, 3.0, 2.0, 4.0]);
    }

    #[test]
    fn test_repeated_month_headers_are_all_tidied() {
        let raw = parse_raw_table(b"Category,Jan,Jan,Feb\nIncome - A,1,2,3\n")
            .unwrap()
            .unwrap();
        let tidy = tidy_table(&raw, Path::new("2020.csv"));

        let cells: Vec<(u32, f64)> = tidy.records.iter().map(|r| (r.month, r.amount)).collect();
        assert_eq!(cells, vec![(1, 1.0), (1, 2.0), (2, 3.0)]);
        assert_eq!(tidy.diagnostics.dropped_count(), 0);
    }

    #[test]
    fn test_missing_category_becomes_empty_type() {
        let raw = table(&["Category", "Jan"], &[&["", "7"]]);
        let tidy = tidy_table(&raw, Path::new("2024.csv"));

        assert_eq!(row(&tidy.records, 0), (Some(2024), 1, "", None, 7.0));
    }

    #[test]
    fn test_tidy_file_writes_output() {
        let temp_dir = TempDir::new().unwrap();
        let raw_path = temp_dir.path().join("2023_budget.csv");
        fs::write(
            &raw_path,
            "Category,Jan,Feb,Total\nIncome - Salary,1000,1000,2000\nExpense - Rent,-500,(500),1000\n",
        )
        .unwrap();

        let tidier = CsvTidier::new(temp_dir.path().join("tidy"));
        let outcome = tidier.tidy_file(&raw_path).unwrap();

        let FileOutcome::Tidied(report) = outcome else {
            panic!("Expected a tidied outcome");
        };
        assert_eq!(report.rows, 4);
        assert_eq!(
            report.output_path,
            temp_dir.path().join("tidy").join("2023_budget_tidy.csv")
        );

        let records = frame_to_records(&read_tidy_csv(&report.output_path).unwrap()).unwrap();
        assert_eq!(row(&records, 0), (Some(2023), 1, "Expense", Some("Rent"), -500.0));
        assert_eq!(row(&records, 3), (Some(2023), 2, "Income", Some("Salary"), 1000.0));
    }

    #[test]
    fn test_tidy_file_skips_header_only_file() {
        let temp_dir = TempDir::new().unwrap();
        let raw_path = temp_dir.path().join("empty.csv");
        fs::write(&raw_path, "Category,Jan,Feb\n").unwrap();

        let tidier = CsvTidier::new(temp_dir.path().join("tidy"));
        let outcome = tidier.tidy_file(&raw_path).unwrap();

        assert_eq!(outcome, FileOutcome::SkippedEmpty { path: raw_path.clone() });
        assert!(!tidier.output_path_for(&raw_path).exists());
    }

    #[test]
    fn test_tidy_file_missing_input_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let tidier = CsvTidier::new(temp_dir.path().to_path_buf());

        assert!(tidier.tidy_file(&temp_dir.path().join("absent.csv")).is_err());
    }
}
