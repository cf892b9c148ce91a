//! File discovery for raw ledger exports
//!
//! Finds the CSV files directly inside the raw input directory, in file
//! name order so every run tidies and merges them identically.

use crate::constants::RAW_FILE_EXTENSION;
use crate::error::{LedgerError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// File discovery component for the raw input directory
#[derive(Debug)]
pub struct FileDiscovery {
    raw_dir: PathBuf,
}

impl FileDiscovery {
    /// Create a new file discovery instance
    pub fn new(raw_dir: PathBuf) -> Self {
        Self { raw_dir }
    }

    /// Discover raw CSV files, sorted by file name.
    ///
    /// Subdirectories are not searched.
    pub async fn discover_csv_files(&self) -> Result<Vec<PathBuf>> {
        if !fs::try_exists(&self.raw_dir).await? {
            return Err(LedgerError::MissingInputDirectory {
                path: self.raw_dir.clone(),
            });
        }

        debug!("Searching for CSV files in: {}", self.raw_dir.display());

        let mut files = Vec::new();
        let mut dir = fs::read_dir(&self.raw_dir).await?;

        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() && is_csv_file(&path) {
                files.push(path);
            }
        }

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        debug!("Found {} CSV files", files.len());

        Ok(files)
    }
}

/// Check if a path is a CSV file
fn is_csv_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == RAW_FILE_EXTENSION)
}
