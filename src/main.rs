use anyhow::Context;
use clap::Parser;
use ledger_tidy::cli::{self, Args};
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    if let Err(error) = cli::setup_logging(&args) {
        eprintln!("Failed to set up logging: {}", error);
        process::exit(1);
    }

    // Create async runtime and run the pipeline
    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime
        .block_on(cli::run(args))
        .context("Ledger tidy run failed");

    match result {
        Ok(stats) if stats.has_failures() => {
            // Summary already lists the failed files
            eprintln!(
                "Error: {} file(s) could not be tidied",
                stats.failed_files.len()
            );
            process::exit(1);
        }
        Ok(_stats) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}
