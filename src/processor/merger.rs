//! Merged dataset writing
//!
//! Concatenates tidy CSV files into one Parquet dataset. Files are stacked
//! in the order given, each keeping its own row order.

use crate::config::ParquetOptions;
use crate::constants::TIDY_FILE_PATTERN;
use crate::error::{LedgerError, Result};
use crate::models::MergeSummary;
use crate::schema::read_tidy_csv;

use polars::prelude::{
    DataFrame, IntoLazy, LazyFrame, ParquetWriter as PolarsParquetWriter, UnionArgs, concat,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Writes the merged dataset from tidy files
#[derive(Debug, Clone)]
pub struct DatasetMerger {
    output_path: PathBuf,
    options: ParquetOptions,
}

impl DatasetMerger {
    /// Create a merger writing to `output_path`
    pub fn new(output_path: PathBuf, options: ParquetOptions) -> Self {
        Self {
            output_path,
            options,
        }
    }

    /// Concatenate `tidy_files` in order and write the merged dataset.
    ///
    /// Returns `None` without writing anything when there is nothing to merge.
    pub fn merge(&self, tidy_files: &[PathBuf]) -> Result<Option<MergeSummary>> {
        if tidy_files.is_empty() {
            warn!("No tidy files to merge into {}", self.output_path.display());
            return Ok(None);
        }

        debug!("Merging {} tidy files", tidy_files.len());

        let frames = tidy_files
            .iter()
            .map(|path| {
                read_tidy_csv(path)
                    .map(IntoLazy::lazy)
                    .map_err(|e| LedgerError::ProcessingFailed {
                        path: path.clone(),
                        reason: format!("Failed to read tidy file: {}", e),
                    })
            })
            .collect::<Result<Vec<LazyFrame>>>()?;

        let union = UnionArgs {
            parallel: false,
            ..Default::default()
        };
        let mut merged = concat(frames, union)?.collect()?;

        self.write_parquet(&mut merged)?;

        let summary = MergeSummary {
            files_merged: tidy_files.len(),
            total_rows: merged.height(),
            output_path: self.output_path.clone(),
        };

        info!(
            "Merged {} tidy files into {} ({} rows)",
            summary.files_merged,
            summary.output_path.display(),
            summary.total_rows
        );

        Ok(Some(summary))
    }

    /// Merge every tidy file already present in `tidy_dir`, by file name.
    ///
    /// Unlike a full run, which merges only the outputs it just wrote, this
    /// includes tidy files left over from raw files that no longer exist.
    pub fn merge_directory(&self, tidy_dir: &Path) -> Result<Option<MergeSummary>> {
        let tidy_files = discover_tidy_files(tidy_dir)?;
        self.merge(&tidy_files)
    }

    fn write_parquet(&self, df: &mut DataFrame) -> Result<()> {
        if let Some(parent) = self.output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::File::create(&self.output_path)?;
        PolarsParquetWriter::new(file)
            .with_compression(self.options.compression.to_polars_compression())
            .with_statistics(self.options.statistics())
            .with_row_group_size(self.options.row_group_size)
            .finish(df)
            .map_err(|e| LedgerError::ProcessingFailed {
                path: self.output_path.clone(),
                reason: format!("Failed to write merged parquet: {}", e),
            })?;

        Ok(())
    }
}

/// Tidy files in a directory, sorted by file name
pub fn discover_tidy_files(tidy_dir: &Path) -> Result<Vec<PathBuf>> {
    // Escape the directory so brackets in paths are not read as glob syntax
    let pattern = format!(
        "{}/{}",
        glob::Pattern::escape(&tidy_dir.to_string_lossy()),
        TIDY_FILE_PATTERN
    );

    let mut files = Vec::new();
    for entry in glob::glob(&pattern)? {
        let path = entry?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
