//! Ledger Tidy Library
//!
//! Turns wide, spreadsheet-style ledger exports (one row per category, one
//! column per month) into a single long-format dataset.
//!
//! This library provides tools for:
//! - Parsing free-form period labels and messy currency amounts
//! - Picking out the month columns of a header row
//! - Reshaping each raw CSV file into a sorted tidy CSV file
//! - Merging every tidy file into one Parquet dataset
//! - Running the whole pipeline concurrently with per-file failure isolation

pub mod amount;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod header;
pub mod models;
pub mod period;
pub mod processor;
pub mod schema;

// Re-export commonly used types
pub use config::{LedgerConfig, PipelinePaths};
pub use error::{LedgerError, Result};
pub use models::{ProcessingStats, TidyRecord};
pub use processor::LedgerProcessor;
