//! Error handling for ledger tidying operations.
//!
//! Only conditions that stop a run (or a single file) are errors. Empty
//! inputs, skipped files and unparseable cells are reported through
//! outcomes and diagnostics instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to read matched path: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("Raw input directory not found: {path}")]
    MissingInputDirectory { path: PathBuf },

    #[error("Processing failed for file: {path} - {reason}")]
    ProcessingFailed { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
