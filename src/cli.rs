//! Command-line interface components.

use crate::config::{CompressionAlgorithm, LedgerConfig, PipelinePaths};
use crate::error::{LedgerError, Result};
use crate::models::ProcessingStats;
use crate::processor::LedgerProcessor;
use crate::processor::merger::DatasetMerger;

use clap::Parser;
use colored::*;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "ledger-tidy")]
#[command(about = "Reshape wide ledger CSV exports into one tidy dataset")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Project root holding data/raw, data/tidy and data/processed
    #[arg(value_name = "ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Raw input directory (default: ROOT/data/raw)
    #[arg(long)]
    pub raw_dir: Option<PathBuf>,

    /// Directory for per-file tidy CSVs (default: ROOT/data/tidy)
    #[arg(long)]
    pub tidy_dir: Option<PathBuf>,

    /// Merged Parquet file (default: ROOT/data/processed/all_years_data.parquet)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of files tidied concurrently
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Abort the whole run on the first file that fails
    #[arg(long)]
    pub fail_fast: bool,

    /// Parquet compression algorithm (snappy, zstd, lz4, none)
    #[arg(long, default_value = "snappy")]
    pub compression: String,

    /// Skip tidying and merge the tidy files already on disk
    #[arg(long)]
    pub merge_only: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Resolve pipeline paths from the root and any overrides
    pub fn paths(&self) -> PipelinePaths {
        let mut paths = PipelinePaths::from_root(&self.root);
        if let Some(raw_dir) = &self.raw_dir {
            paths = paths.with_raw_dir(raw_dir.clone());
        }
        if let Some(tidy_dir) = &self.tidy_dir {
            paths = paths.with_tidy_dir(tidy_dir.clone());
        }
        if let Some(output) = &self.output {
            paths = paths.with_merged_path(output.clone());
        }
        paths
    }

    /// Build the run configuration from command line flags
    pub fn config(&self) -> Result<LedgerConfig> {
        let compression: CompressionAlgorithm = self.compression.parse()?;
        let mut config = LedgerConfig::default().with_compression(compression);

        if let Some(jobs) = self.jobs {
            config = config.with_max_concurrent_files(jobs);
        }
        if self.fail_fast {
            config = config.with_fail_fast();
        }
        if self.no_progress {
            config = config.without_progress();
        }

        config.validate()?;
        Ok(config)
    }

    fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

/// Run the command described by `args`
pub async fn run(args: Args) -> Result<ProcessingStats> {
    debug!("Command line arguments: {:?}", args);

    let paths = args.paths();
    let config = args.config()?;

    if args.merge_only {
        return run_merge_only(&paths, &config);
    }

    info!("Starting ledger tidy run in {}", args.root.display());
    let processor = LedgerProcessor::new(paths)?.with_config(config);
    processor.process().await
}

/// Merge existing tidy files without touching the raw directory
fn run_merge_only(paths: &PipelinePaths, config: &LedgerConfig) -> Result<ProcessingStats> {
    println!("{}", "Merging existing tidy files".bright_green().bold());

    let merger = DatasetMerger::new(paths.merged_path.clone(), config.parquet.clone());
    let mut stats = ProcessingStats::default();

    match merger.merge_directory(&paths.tidy_dir)? {
        Some(summary) => {
            println!(
                "  {} {} files, {} rows -> {}",
                "Merged:".bright_cyan(),
                summary.files_merged.to_string().bright_white(),
                summary.total_rows.to_string().bright_white().bold(),
                summary.output_path.display()
            );
            stats.merged_rows = summary.total_rows;
            stats.merged_output = Some(summary.output_path);
        }
        None => println!("  {}", "No tidy files found, nothing merged".bright_yellow()),
    }

    Ok(stats)
}

/// Install the tracing subscriber for the binary
pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ledger_tidy={}", args.log_level())));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init()
        .map_err(|e| LedgerError::Configuration {
            message: format!("Failed to install logging subscriber: {}", e),
        })
}
