// notionbackup/src/notion/mod.rs
pub(crate) mod client;
pub(crate) mod types;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

pub use client::NotionClient;
pub use types::{Entity, EntityKind, SearchQuery, SearchResultPage};

/// The two remote calls a backup needs from the workspace.
#[async_trait]
pub trait WorkspaceApi: Send + Sync {
    /// Fetches one page of search results for `query`.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResultPage>;

    /// Fetches the block children of a page. The response is kept as-is.
    async fn list_block_children(&self, block_id: &str) -> Result<Value>;
}
