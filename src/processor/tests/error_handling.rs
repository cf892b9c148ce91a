//! Error handling integration tests

use super::{BUDGET_2023, create_project, file_names, test_config};
use crate::config::PipelinePaths;
use crate::error::LedgerError;
use crate::processor::LedgerProcessor;
use std::fs;
use tempfile::TempDir;

/// Invalid UTF-8 in a data row makes the raw reader fail for that file
const BROKEN_CSV: &[u8] = b"Category,Jan\nIncome - \xFF\xFE,10\n";

#[tokio::test]
async fn test_missing_raw_directory() {
    let temp_dir = TempDir::new().unwrap();
    let paths = PipelinePaths::from_root(temp_dir.path());

    let result = LedgerProcessor::new(paths.clone());

    match result.unwrap_err() {
        LedgerError::MissingInputDirectory { path } => assert_eq!(path, paths.raw_dir),
        other => panic!("Expected MissingInputDirectory error, got {other:?}"),
    }
    // Nothing is bootstrapped when the precondition fails
    assert!(!paths.tidy_dir.exists());
}

#[tokio::test]
async fn test_raw_directory_removed_before_run() {
    let (_temp_dir, paths) = create_project(&[("2023_budget.csv", BUDGET_2023)]);
    let processor = LedgerProcessor::new(paths.clone())
        .unwrap()
        .with_config(test_config());

    fs::remove_dir_all(&paths.raw_dir).unwrap();
    let result = processor.process().await;

    assert!(matches!(
        result,
        Err(LedgerError::MissingInputDirectory { .. })
    ));
    assert!(!paths.merged_path.exists());
}

#[tokio::test]
async fn test_failed_file_is_isolated() {
    let (_temp_dir, paths) = create_project(&[("2023_budget.csv", BUDGET_2023)]);
    fs::write(paths.raw_dir.join("2022_broken.csv"), BROKEN_CSV).unwrap();
    fs::write(paths.raw_dir.join("2024_empty.csv"), "").unwrap();

    let processor = LedgerProcessor::new(paths.clone())
        .unwrap()
        .with_config(test_config());
    let stats = processor.process().await.unwrap();

    assert!(stats.has_failures());
    let failed: Vec<_> = stats.failed_files.iter().map(|(p, _)| p.clone()).collect();
    assert_eq!(file_names(&failed), vec!["2022_broken.csv"]);
    assert_eq!(file_names(&stats.skipped_files), vec!["2024_empty.csv"]);
    assert_eq!(stats.files_tidied, 1);
    assert_eq!(stats.merged_rows, 4);
    assert!(paths.merged_path.exists());
}

#[tokio::test]
async fn test_fail_fast_aborts_without_merging() {
    let (_temp_dir, paths) = create_project(&[("2023_budget.csv", BUDGET_2023)]);
    fs::write(paths.raw_dir.join("2022_broken.csv"), BROKEN_CSV).unwrap();

    let config = test_config().with_fail_fast().with_max_concurrent_files(1);
    let processor = LedgerProcessor::new(paths.clone())
        .unwrap()
        .with_config(config);
    let result = processor.process().await;

    match result.unwrap_err() {
        LedgerError::ProcessingFailed { path, .. } => {
            assert!(path.ends_with("2022_broken.csv"));
        }
        other => panic!("Expected ProcessingFailed error, got {other:?}"),
    }
    assert!(!paths.merged_path.exists());
}

#[tokio::test]
async fn test_all_files_failing_skips_merge() {
    let (_temp_dir, paths) = create_project(&[]);
    fs::write(paths.raw_dir.join("2022_broken.csv"), BROKEN_CSV).unwrap();

    let processor = LedgerProcessor::new(paths.clone())
        .unwrap()
        .with_config(test_config());
    let stats = processor.process().await.unwrap();

    assert_eq!(stats.failed_files.len(), 1);
    assert_eq!(stats.merged_output, None);
    assert!(!paths.merged_path.exists());
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let (_temp_dir, paths) = create_project(&[("2023_budget.csv", BUDGET_2023)]);
    let processor = LedgerProcessor::new(paths)
        .unwrap()
        .with_config(test_config().with_max_concurrent_files(0));

    assert!(matches!(
        processor.process().await,
        Err(LedgerError::Configuration { .. })
    ));
}
