mod logic;
pub(crate) mod archive;     // tar.gz packing of a finished run
pub(crate) mod content;     // sequential page content aggregation
pub(crate) mod pagination;  // cursor-following search
pub(crate) mod storage;     // artifact persistence
#[cfg(test)]
pub(crate) mod testing;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::config::AppConfig;
use crate::notion::NotionClient;

pub use logic::BackupOutcome;
use logic::BackupOrchestrator;
use storage::LocalArtifactStore;

/// Public entry point for the backup process.
///
/// Errors only for problems found before the pipeline starts (HTTP client
/// setup, output directory). Pipeline failures come back as
/// [`BackupOutcome::Failed`].
pub async fn run_backup_flow(app_config: &AppConfig) -> Result<BackupOutcome> {
    if let Some(proxy) = &app_config.proxy {
        info!("using proxy {}", proxy);
    }

    let client = NotionClient::from_config(app_config).context("Failed to set up Notion client")?;
    let store = LocalArtifactStore::create(&app_config.output_root)
        .context("Failed to prepare output directory")?;

    let orchestrator = BackupOrchestrator::new(&client, &store, &app_config.backup);
    let outcome = orchestrator.run().await;

    if app_config.archive && matches!(outcome, BackupOutcome::Done(_)) {
        let run_dir = store.run_dir().to_path_buf();
        match tokio::task::spawn_blocking(move || archive::create_tar_gz_archive(&run_dir)).await {
            Ok(Ok(path)) => info!("Archive written to {}", path.display()),
            Ok(Err(e)) => error!("Failed to archive backup: {:#}", e),
            Err(e) => error!("Archive task panicked: {}", e),
        }
    }

    Ok(outcome)
}
