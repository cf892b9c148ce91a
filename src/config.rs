//! Configuration management and validation.
//!
//! Provides the run configuration (concurrency, failure policy, Parquet
//! options) and the directory layout of a ledger project.

use crate::constants::{
    MAX_DEFAULT_CONCURRENCY, MERGED_FILE_NAME, PROCESSED_DIR, RAW_DIR, TIDY_DIR,
};
use crate::error::{LedgerError, Result};
use polars::prelude::{ParquetCompression, StatisticsOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Supported compression algorithms for the merged Parquet file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// LZ4 compression - fastest, lower compression ratio
    Lz4,
    /// No compression
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

impl FromStr for CompressionAlgorithm {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "snappy" => Ok(CompressionAlgorithm::Snappy),
            "zstd" => Ok(CompressionAlgorithm::Zstd),
            "lz4" => Ok(CompressionAlgorithm::Lz4),
            "none" | "uncompressed" => Ok(CompressionAlgorithm::Uncompressed),
            other => Err(LedgerError::Configuration {
                message: format!(
                    "Unknown compression '{}' (expected snappy, zstd, lz4 or none)",
                    other
                ),
            }),
        }
    }
}

/// Parquet writer options for the merged dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParquetOptions {
    pub compression: CompressionAlgorithm,

    /// Write column statistics
    pub enable_statistics: bool,

    /// Rows per row group; `None` keeps the writer default
    pub row_group_size: Option<usize>,
}

impl Default for ParquetOptions {
    fn default() -> Self {
        Self {
            compression: CompressionAlgorithm::Snappy,
            enable_statistics: true,
            row_group_size: None,
        }
    }
}

impl ParquetOptions {
    pub fn statistics(&self) -> StatisticsOptions {
        if self.enable_statistics {
            StatisticsOptions::full()
        } else {
            StatisticsOptions::empty()
        }
    }
}

/// Global configuration for a tidy run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Maximum number of files tidied at once
    pub max_concurrent_files: usize,

    /// Abort the run on the first file that fails to tidy
    pub fail_fast: bool,

    /// Show a progress bar while tidying
    pub show_progress: bool,

    /// Merged dataset writer options
    pub parquet: ParquetOptions,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_files: num_cpus::get().clamp(1, MAX_DEFAULT_CONCURRENCY),
            fail_fast: false,
            show_progress: true,
            parquet: ParquetOptions::default(),
        }
    }
}

impl LedgerConfig {
    /// Set maximum concurrent files
    pub fn with_max_concurrent_files(mut self, max_files: usize) -> Self {
        self.max_concurrent_files = max_files;
        self
    }

    /// Stop at the first failing file instead of skipping it
    pub fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Disable the progress bar
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.parquet.compression = compression;
        self
    }

    pub fn with_parquet_options(mut self, options: ParquetOptions) -> Self {
        self.parquet = options;
        self
    }

    /// Check settings that would otherwise fail mid-run
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_files == 0 {
            return Err(LedgerError::Configuration {
                message: "max_concurrent_files must be at least 1".to_string(),
            });
        }
        if self.parquet.row_group_size == Some(0) {
            return Err(LedgerError::Configuration {
                message: "row_group_size must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Where a run reads raw files and writes its outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelinePaths {
    pub raw_dir: PathBuf,
    pub tidy_dir: PathBuf,
    pub merged_path: PathBuf,
}

impl PipelinePaths {
    /// Standard `data/raw`, `data/tidy`, `data/processed` layout under a project root
    pub fn from_root(root: &Path) -> Self {
        let join = |parts: &[&str]| parts.iter().fold(root.to_path_buf(), |p, part| p.join(part));
        Self {
            raw_dir: join(RAW_DIR),
            tidy_dir: join(TIDY_DIR),
            merged_path: join(PROCESSED_DIR).join(MERGED_FILE_NAME),
        }
    }

    pub fn with_raw_dir(mut self, raw_dir: PathBuf) -> Self {
        self.raw_dir = raw_dir;
        self
    }

    pub fn with_tidy_dir(mut self, tidy_dir: PathBuf) -> Self {
        self.tidy_dir = tidy_dir;
        self
    }

    pub fn with_merged_path(mut self, merged_path: PathBuf) -> Self {
        self.merged_path = merged_path;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LedgerConfig::default();
        assert!(config.max_concurrent_files >= 1);
        assert!(config.max_concurrent_files <= MAX_DEFAULT_CONCURRENCY);
        assert!(!config.fail_fast);
        assert_eq!(config.parquet.compression, CompressionAlgorithm::Snappy);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = LedgerConfig::default()
            .with_max_concurrent_files(1)
            .with_fail_fast()
            .without_progress()
            .with_compression(CompressionAlgorithm::Zstd);

        assert_eq!(config.max_concurrent_files, 1);
        assert!(config.fail_fast);
        assert!(!config.show_progress);
        assert_eq!(config.parquet.compression, CompressionAlgorithm::Zstd);
    }

    #[test]
    fn test_validation_rejects_zero_concurrency() {
        let config = LedgerConfig::default().with_max_concurrent_files(0);
        assert!(matches!(
            config.validate(),
            Err(LedgerError::Configuration { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_empty_row_groups() {
        let options = ParquetOptions {
            row_group_size: Some(0),
            ..ParquetOptions::default()
        };
        let config = LedgerConfig::default().with_parquet_options(options);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_compression_from_str() {
        assert_eq!(
            "ZSTD".parse::<CompressionAlgorithm>().unwrap(),
            CompressionAlgorithm::Zstd
        );
        assert_eq!(
            "none".parse::<CompressionAlgorithm>().unwrap(),
            CompressionAlgorithm::Uncompressed
        );
        assert!("brotli".parse::<CompressionAlgorithm>().is_err());
    }

    #[test]
    fn test_paths_from_root() {
        let paths = PipelinePaths::from_root(Path::new("/project"));
        assert_eq!(paths.raw_dir, PathBuf::from("/project/data/raw"));
        assert_eq!(paths.tidy_dir, PathBuf::from("/project/data/tidy"));
        assert_eq!(
            paths.merged_path,
            PathBuf::from("/project/data/processed/all_years_data.parquet")
        );

        let custom = paths.with_raw_dir(PathBuf::from("/elsewhere"));
        assert_eq!(custom.raw_dir, PathBuf::from("/elsewhere"));
    }
}
