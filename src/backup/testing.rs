//! In-memory test doubles for the backup pipeline.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use crate::backup::storage::ArtifactStore;
use crate::notion::{Entity, SearchQuery, SearchResultPage, WorkspaceApi};

pub fn entity(id: &str) -> Entity {
    let mut payload = Map::new();
    payload.insert("object".to_string(), json!("page"));
    Entity {
        id: id.to_string(),
        payload,
    }
}

/// A result page; `cursor` present means `has_more`.
pub fn page(ids: &[&str], cursor: Option<&str>) -> SearchResultPage {
    SearchResultPage {
        results: ids.iter().map(|id| entity(id)).collect(),
        has_more: cursor.is_some(),
        next_cursor: cursor.map(str::to_string),
    }
}

pub fn blocks_for(id: &str) -> Value {
    json!({ "object": "list", "block_id": id, "results": [], "has_more": false })
}

/// Workspace API that replays scripted responses and records every call.
#[derive(Default)]
pub struct ScriptedApi {
    searches: Mutex<VecDeque<Result<SearchResultPage, String>>>,
    search_fallback: Mutex<Option<String>>,
    search_calls: Mutex<Vec<SearchQuery>>,
    contents: Mutex<HashMap<String, VecDeque<Result<Value, String>>>>,
    broken_contents: Mutex<HashSet<String>>,
    content_calls: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_search(&self, response: Result<SearchResultPage, &str>) {
        self.searches
            .lock()
            .unwrap()
            .push_back(response.map_err(str::to_string));
    }

    /// Every search beyond the scripted ones fails with `message`.
    pub fn fail_searches_with(&self, message: &str) {
        *self.search_fallback.lock().unwrap() = Some(message.to_string());
    }

    /// Scripted content response for `id`; unscripted ids get [`blocks_for`].
    pub fn push_content(&self, id: &str, response: Result<Value, &str>) {
        self.contents
            .lock()
            .unwrap()
            .entry(id.to_string())
            .or_default()
            .push_back(response.map_err(str::to_string));
    }

    pub fn break_content(&self, id: &str) {
        self.broken_contents.lock().unwrap().insert(id.to_string());
    }

    pub fn search_calls(&self) -> Vec<SearchQuery> {
        self.search_calls.lock().unwrap().clone()
    }

    pub fn content_calls(&self) -> Vec<String> {
        self.content_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkspaceApi for ScriptedApi {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResultPage> {
        self.search_calls.lock().unwrap().push(query.clone());
        let next = self.searches.lock().unwrap().pop_front();
        match next {
            Some(Ok(page)) => Ok(page),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => match self.search_fallback.lock().unwrap().clone() {
                Some(message) => Err(anyhow::anyhow!(message)),
                None => Err(anyhow::anyhow!("unexpected search call")),
            },
        }
    }

    async fn list_block_children(&self, block_id: &str) -> Result<Value> {
        self.content_calls.lock().unwrap().push(block_id.to_string());
        if self.broken_contents.lock().unwrap().contains(block_id) {
            return Err(anyhow::anyhow!("{} failed", block_id));
        }
        let next = self
            .contents
            .lock()
            .unwrap()
            .get_mut(block_id)
            .and_then(VecDeque::pop_front);
        match next {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Ok(blocks_for(block_id)),
        }
    }
}

/// Artifact store kept in memory, with an optional failure switch.
#[derive(Default)]
pub struct MemoryStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
    fail_on: Mutex<Option<String>>,
    writes: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes writes of artifact `name` fail.
    pub fn fail_writes_of(&self, name: &str) {
        *self.fail_on.lock().unwrap() = Some(name.to_string());
    }

    pub fn json(&self, name: &str) -> Option<Value> {
        self.files
            .lock()
            .unwrap()
            .get(name)
            .map(|bytes| serde_json::from_slice(bytes).unwrap())
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn persist(&self, name: &str, bytes: &[u8]) -> Result<()> {
        self.writes.lock().unwrap().push(name.to_string());
        if self.fail_on.lock().unwrap().as_deref() == Some(name) {
            anyhow::bail!("disk full while writing {}", name);
        }
        self.files
            .lock()
            .unwrap()
            .insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}
