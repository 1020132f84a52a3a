// notionbackup/src/backup/logic.rs
use anyhow::Result;
use serde_json::json;
use tracing::{debug, error, info, warn};

use super::content::aggregate;
use super::pagination::search_with_retry;
use super::storage::{Artifact, ArtifactStore, persist_json};
use crate::config::BackupConfig;
use crate::notion::{EntityKind, SearchQuery, WorkspaceApi};
use crate::retry::RetryOutcome;

/// Where an attempt currently is. `Failed` is reachable from every fetch or
/// persist stage once the task-level retries are spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupStage {
    Idle,
    FetchingPages,
    FetchingContent,
    FetchingDatabases,
    Persisting,
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupSummary {
    pub pages: usize,
    pub databases: usize,
    pub page_contents: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    Done(BackupSummary),
    /// The task-level retries were spent; `error.json` holds `message`.
    Failed { message: String },
}

/// Runs the whole backup under the task-level retry policy.
pub struct BackupOrchestrator<'a, A: ?Sized, S: ?Sized> {
    api: &'a A,
    store: &'a S,
    config: &'a BackupConfig,
}

fn advance(stage: &mut BackupStage, next: BackupStage) {
    debug!("{:?} -> {:?}", stage, next);
    *stage = next;
}

impl<'a, A, S> BackupOrchestrator<'a, A, S>
where
    A: WorkspaceApi + ?Sized,
    S: ArtifactStore + ?Sized,
{
    pub fn new(api: &'a A, store: &'a S, config: &'a BackupConfig) -> Self {
        Self { api, store, config }
    }

    /// Never returns an error: exhaustion is recorded in `error.json` and
    /// reported as [`BackupOutcome::Failed`].
    pub async fn run(&self) -> BackupOutcome {
        info!("Begin backup task");

        match self
            .config
            .task_retry
            .run("backup task", || self.download())
            .await
        {
            RetryOutcome::Completed(summary) => {
                info!("Success");
                BackupOutcome::Done(summary)
            }
            RetryOutcome::Exhausted { attempts, error } => {
                let message = format!("{:#}", error);
                error!("task failed after {} attempts, err: {}", attempts, message);
                debug!("backup -> {:?}", BackupStage::Failed);

                if let Err(write_err) =
                    persist_json(self.store, Artifact::Error, &json!({ "err": message })).await
                {
                    error!("Failed to write error artifact: {:#}", write_err);
                }
                BackupOutcome::Failed { message }
            }
        }
    }

    /// One full attempt. Nothing carries over between attempts.
    async fn download(&self) -> Result<BackupSummary> {
        let mut stage = BackupStage::Idle;
        let result = self.attempt(&mut stage).await;
        if let Err(err) = &result {
            warn!("backup attempt failed during {:?}: {:#}", stage, err);
        }
        result
    }

    async fn attempt(&self, stage: &mut BackupStage) -> Result<BackupSummary> {
        let api_retry = &self.config.api_retry;

        advance(stage, BackupStage::FetchingPages);
        let pages =
            search_with_retry(self.api, SearchQuery::for_kind(EntityKind::Page), api_retry).await?;

        advance(stage, BackupStage::FetchingContent);
        let ids: Vec<&str> = pages.iter().map(|page| page.id.as_str()).collect();
        let pages_content = aggregate(self.api, &ids, api_retry).await?;

        advance(stage, BackupStage::FetchingDatabases);
        let databases =
            search_with_retry(self.api, SearchQuery::for_kind(EntityKind::Database), api_retry)
                .await?;

        advance(stage, BackupStage::Persisting);
        persist_json(self.store, Artifact::Pages, &pages).await?;
        persist_json(self.store, Artifact::PagesContent, &pages_content).await?;
        persist_json(self.store, Artifact::Databases, &databases).await?;

        let summary = BackupSummary {
            pages: pages.len(),
            databases: databases.len(),
            page_contents: pages_content.len(),
        };
        info!(
            "downloaded page {}, databases: {}, pageContents: {}",
            summary.pages, summary.databases, summary.page_contents
        );
        advance(stage, BackupStage::Done);
        Ok(summary)
    }
}
