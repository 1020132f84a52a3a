//! Notion Workspace Backup Tool
//!
//! Downloads every page, page content and database of a Notion workspace
//! into a timestamped directory of JSON files.

// notionbackup/src/main.rs
mod backup;
mod config;
mod errors;
mod notion;
mod retry;

use anyhow::{Context, Result};
use backup::BackupOutcome;
use clap::Parser;
use config::{AppConfig, Cli, LogLevel};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the backup tool
#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine; the environment and flags still apply.
    dotenv::dotenv().ok();

    match run_app().await {
        Ok(BackupOutcome::Done(_)) => ExitCode::SUCCESS,
        Ok(BackupOutcome::Failed { message }) => {
            eprintln!("❌ Backup failed: {}", message);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("❌ Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_app() -> Result<BackupOutcome> {
    let cli = Cli::parse();
    let app_config = AppConfig::from_cli(cli).context("Failed to load configuration")?;
    init_tracing(app_config.log_level);

    backup::run_backup_flow(&app_config)
        .await
        .context("Backup process failed")
}

/// `RUST_LOG` wins when set; otherwise the configured level applies to this
/// crate and dependencies only report warnings.
fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("warn,notionbackup={}", level.as_filter()).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
