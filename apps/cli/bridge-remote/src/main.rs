use bridge_remote::cli::Cli;
use bridge_remote::commands;
use bridge_remote::error::AppError;
use bridge_remote::logger::initialize as LoggerInitialize;

use client_core::config::default_data_dir;

use std::fs::create_dir_all;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

fn prepare_logging(verbose: bool) -> Result<(), AppError> {
    let log_dir = default_data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("logs");

    create_dir_all(&log_dir)
        .map_err(|e| AppError::app(format!("Failed to create log directory: {e}")))?;

    LoggerInitialize(&log_dir, verbose)?;
    info!("Log directory: {}", log_dir.display());
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logger FIRST; carry on without it if the log file is unavailable
    if let Err(e) = prepare_logging(cli.verbose) {
        eprintln!("{}", e.user_message());
    }

    info!("bridge-remote {} starting", env!("CARGO_PKG_VERSION"));

    match commands::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
