//! Main processing engine.
//!
//! Orchestrates a full run: discover raw files, tidy each one (a few at a
//! time, results kept in file name order), then merge every tidied file
//! into the final dataset.

pub mod discovery;
pub mod merger;
pub mod tidier;

#[cfg(test)]
pub mod tests;

use self::{discovery::FileDiscovery, merger::DatasetMerger, tidier::CsvTidier};

use crate::config::{LedgerConfig, PipelinePaths};
use crate::error::{LedgerError, Result};
use crate::models::{FileOutcome, ProcessingStats};

use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::fs;
use tokio::task;
use tracing::{debug, error, info, warn};

/// Main processor for a ledger tidy run
#[derive(Debug)]
pub struct LedgerProcessor {
    paths: PipelinePaths,
    config: LedgerConfig,
    file_discovery: FileDiscovery,
    tidier: Arc<CsvTidier>,
    merger: DatasetMerger,
}

impl LedgerProcessor {
    /// Create a new processor.
    ///
    /// Fails when the raw input directory does not exist.
    pub fn new(paths: PipelinePaths) -> Result<Self> {
        if !paths.raw_dir.is_dir() {
            return Err(LedgerError::MissingInputDirectory {
                path: paths.raw_dir.clone(),
            });
        }

        let config = LedgerConfig::default();

        Ok(Self {
            file_discovery: FileDiscovery::new(paths.raw_dir.clone()),
            tidier: Arc::new(CsvTidier::new(paths.tidy_dir.clone())),
            merger: DatasetMerger::new(paths.merged_path.clone(), config.parquet.clone()),
            paths,
            config,
        })
    }

    /// Configure the processor
    pub fn with_config(mut self, config: LedgerConfig) -> Self {
        self.merger = DatasetMerger::new(self.paths.merged_path.clone(), config.parquet.clone());
        self.config = config;
        self
    }

    /// Main processing entry point
    pub async fn process(&self) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        self.config.validate()?;

        println!("{}", "Starting ledger tidy run".bright_green().bold());
        println!("  {} {}", "Raw:".bright_cyan(), self.paths.raw_dir.display());
        println!("  {} {}", "Tidy:".bright_cyan(), self.paths.tidy_dir.display());
        println!(
            "  {} {}",
            "Output:".bright_cyan(),
            self.paths.merged_path.display()
        );

        // Step 1: Discover raw files
        let raw_files = self.file_discovery.discover_csv_files().await?;

        // Step 2: Create output directories
        fs::create_dir_all(&self.paths.tidy_dir).await?;
        if let Some(parent) = self.paths.merged_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut stats = ProcessingStats {
            files_discovered: raw_files.len(),
            ..Default::default()
        };

        if raw_files.is_empty() {
            warn!("No CSV files found in {}", self.paths.raw_dir.display());
            stats.processing_time_ms = start_time.elapsed().as_millis();
            return Ok(stats);
        }
        println!(
            "  {} {} CSV files",
            "Found".bright_green(),
            raw_files.len().to_string().bright_white().bold()
        );

        // Step 3: Tidy every file
        println!("\n{}", "Tidying files...".bright_yellow());
        self.tidy_all(&raw_files, &mut stats).await?;

        // Step 4: Merge the tidied files, in raw file name order
        let merger = self.merger.clone();
        let tidy_outputs = stats.tidy_outputs.clone();
        let summary = task::spawn_blocking(move || merger.merge(&tidy_outputs))
            .await
            .map_err(|e| LedgerError::ProcessingFailed {
                path: self.paths.merged_path.clone(),
                reason: format!("Merge task failed: {}", e),
            })??;

        if let Some(summary) = summary {
            stats.merged_rows = summary.total_rows;
            stats.merged_output = Some(summary.output_path);
        }

        stats.processing_time_ms = start_time.elapsed().as_millis();
        print_summary(&stats);

        Ok(stats)
    }

    /// Tidy files concurrently while collecting outcomes in input order
    async fn tidy_all(&self, files: &[PathBuf], stats: &mut ProcessingStats) -> Result<()> {
        let pb = if self.config.show_progress {
            let pb = ProgressBar::new(files.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let concurrent_limit = self.config.max_concurrent_files.min(files.len()).max(1);
        debug!("Tidying {} files, {} at a time", files.len(), concurrent_limit);

        let mut results = stream::iter(files.iter().cloned())
            .map(|path| {
                let tidier = Arc::clone(&self.tidier);
                let pb = pb.clone();
                async move {
                    if let Some(name) = path.file_name() {
                        pb.set_message(format!("Tidying: {}", name.to_string_lossy()));
                    }
                    let task_path = path.clone();
                    let result = task::spawn_blocking(move || tidier.tidy_file(&task_path))
                        .await
                        .map_err(|e| LedgerError::ProcessingFailed {
                            path: path.clone(),
                            reason: format!("Tidy task failed: {}", e),
                        })
                        .and_then(|result| result);
                    pb.inc(1);
                    (path, result)
                }
            })
            // Ordered buffering keeps file name order regardless of completion order
            .buffered(concurrent_limit);

        while let Some((path, result)) = results.next().await {
            match result {
                Ok(FileOutcome::Tidied(report)) => {
                    debug!(
                        "Tidied {}: {} rows, {} cells dropped{}",
                        path.display(),
                        report.rows,
                        report.diagnostics.dropped_count(),
                        if report.diagnostics.used_header_fallback {
                            " (no month headers, all columns used)"
                        } else {
                            ""
                        }
                    );
                    stats.files_tidied += 1;
                    stats.tidy_rows += report.rows;
                    stats.dropped_cells += report.diagnostics.dropped_count();
                    stats.tidy_outputs.push(report.output_path);
                }
                Ok(FileOutcome::SkippedEmpty { path }) => {
                    stats.skipped_files.push(path);
                }
                Err(e) => {
                    error!("Failed to tidy {}: {:#}", path.display(), e);
                    if self.config.fail_fast {
                        pb.abandon_with_message("Aborted");
                        return Err(match e {
                            LedgerError::ProcessingFailed { .. } => e,
                            other => LedgerError::ProcessingFailed {
                                path,
                                reason: other.to_string(),
                            },
                        });
                    }
                    stats.failed_files.push((path, e.to_string()));
                }
            }
        }

        pb.finish_with_message("All files tidied");
        info!(
            "Tidied {} of {} files ({} skipped, {} failed)",
            stats.files_tidied,
            files.len(),
            stats.skipped_files.len(),
            stats.failed_files.len()
        );
        Ok(())
    }
}

/// Print the human-facing run summary
fn print_summary(stats: &ProcessingStats) {
    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Files tidied:".bright_cyan(),
        stats.files_tidied.to_string().bright_white()
    );
    if !stats.skipped_files.is_empty() {
        println!(
            "  {} {}",
            "Files skipped (empty):".bright_yellow(),
            stats.skipped_files.len().to_string().bright_yellow()
        );
        for path in &stats.skipped_files {
            println!("    {}", path.display());
        }
    }
    if stats.has_failures() {
        println!(
            "  {} {}",
            "Files failed:".bright_red(),
            stats.failed_files.len().to_string().bright_red().bold()
        );
        for (path, reason) in &stats.failed_files {
            println!("    {} {}", path.display(), reason.bright_black());
        }
    }
    println!(
        "  {} {}",
        "Cells dropped:".bright_cyan(),
        stats.dropped_cells.to_string().bright_white()
    );
    match &stats.merged_output {
        Some(output) => println!(
            "  {} {} rows -> {}",
            "Merged:".bright_cyan(),
            stats.merged_rows.to_string().bright_white().bold(),
            output.display()
        ),
        None => println!("  {}", "No merged dataset written".bright_yellow()),
    }
}
