//! Integration tests for the processor module
//!
//! Tests the complete tidy-and-merge pipeline against temporary project
//! directories.

pub mod error_handling;

use crate::config::{LedgerConfig, PipelinePaths};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Create `data/raw` under a fresh project root and write the given files into it
pub(crate) fn create_project(files: &[(&str, &str)]) -> (TempDir, PipelinePaths) {
    let temp_dir = TempDir::new().unwrap();
    let paths = PipelinePaths::from_root(temp_dir.path());
    fs::create_dir_all(&paths.raw_dir).unwrap();

    for (name, content) in files {
        fs::write(paths.raw_dir.join(name), content).unwrap();
    }

    (temp_dir, paths)
}

/// Configuration suited to tests: no progress bar
pub(crate) fn test_config() -> LedgerConfig {
    LedgerConfig::default().without_progress()
}

pub(crate) fn file_names(paths: &[std::path::PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect()
}

pub(crate) fn read_parquet(path: &Path) -> polars::prelude::DataFrame {
    use polars::prelude::{ParquetReader, SerReader};
    let file = fs::File::open(path).unwrap();
    ParquetReader::new(file).finish().unwrap()
}

pub(crate) const BUDGET_2023: &str = "Category,Jan,Feb,Total
Income - Salary,1000,1000,2000
Expense - Rent,-500,(500),1000
";
