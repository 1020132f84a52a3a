// notionbackup/src/backup/storage.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::AppError;

/// The JSON files a run can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Pages,
    Databases,
    PagesContent,
    Error,
}

impl Artifact {
    pub fn name(&self) -> &'static str {
        match self {
            Artifact::Pages => "pages",
            Artifact::Databases => "databases",
            Artifact::PagesContent => "pagesContent",
            Artifact::Error => "error",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.name())
    }
}

/// Destination for serialized artifacts.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Writes `bytes` under the logical artifact `name`, replacing any
    /// previous content.
    async fn persist(&self, name: &str, bytes: &[u8]) -> Result<()>;
}

/// Serializes `data` and hands it to the store.
pub async fn persist_json<S, T>(store: &S, artifact: Artifact, data: &T) -> Result<()>
where
    S: ArtifactStore + ?Sized,
    T: Serialize + ?Sized,
{
    let bytes = serde_json::to_vec(data)
        .map_err(AppError::SerdeJson)
        .with_context(|| format!("Failed to serialize {}", artifact.file_name()))?;
    debug!("writing {} ({} bytes)", artifact.file_name(), bytes.len());
    store.persist(artifact.name(), &bytes).await
}

/// Directory name for a run started at `now`, e.g. `20240131_235959`.
pub fn run_directory_name(now: DateTime<Local>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

/// Writes artifacts as `<run_dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    run_dir: PathBuf,
}

impl LocalArtifactStore {
    /// Creates `<output_root>/<timestamp>` for this run.
    pub fn create(output_root: &Path) -> Result<Self> {
        let run_dir = output_root.join(run_directory_name(Local::now()));
        std::fs::create_dir_all(&run_dir)
            .map_err(AppError::Io)
            .with_context(|| format!("Failed to create backup directory: {}", run_dir.display()))?;
        info!("Backup directory created at: {}", run_dir.display());
        Ok(Self { run_dir })
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.run_dir.join(format!("{}.json", name))
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn persist(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.artifact_path(name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(AppError::Io)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(AppError::Io)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_run_directory_name_format() {
        let at = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(run_directory_name(at), "20240307_090502");
    }

    #[test]
    fn test_artifact_file_names() {
        assert_eq!(Artifact::Pages.file_name(), "pages.json");
        assert_eq!(Artifact::Databases.file_name(), "databases.json");
        assert_eq!(Artifact::PagesContent.file_name(), "pagesContent.json");
        assert_eq!(Artifact::Error.file_name(), "error.json");
    }

    #[tokio::test]
    async fn test_persist_json_writes_under_run_dir() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let store = LocalArtifactStore::create(root.path())?;
        assert!(store.run_dir().starts_with(root.path()));
        assert!(store.run_dir().is_dir());

        persist_json(&store, Artifact::Error, &json!({ "err": "boom" })).await?;

        let written = std::fs::read_to_string(store.run_dir().join("error.json"))?;
        assert_eq!(written, r#"{"err":"boom"}"#);
        Ok(())
    }

    #[tokio::test]
    async fn test_persist_overwrites_previous_content() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let store = LocalArtifactStore::create(root.path())?;

        store.persist("pages", b"[1,2,3]").await?;
        store.persist("pages", b"[]").await?;

        assert_eq!(std::fs::read_to_string(store.artifact_path("pages"))?, "[]");
        Ok(())
    }

    #[tokio::test]
    async fn test_persist_recreates_missing_directory() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let store = LocalArtifactStore::create(root.path())?;
        std::fs::remove_dir_all(store.run_dir())?;

        store.persist("databases", b"[]").await?;
        assert!(store.artifact_path("databases").is_file());
        Ok(())
    }

    #[tokio::test]
    async fn test_persist_fails_when_path_is_blocked() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let store = LocalArtifactStore::create(root.path())?;
        // A directory where the file should go makes the write fail.
        std::fs::create_dir_all(store.artifact_path("pages"))?;

        assert!(store.persist("pages", b"[]").await.is_err());
        Ok(())
    }
}
