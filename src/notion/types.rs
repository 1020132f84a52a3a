// notionbackup/src/notion/types.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Object kind accepted by the search endpoint's `object` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Page,
    Database,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Page => "page",
            EntityKind::Database => "database",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchFilter {
    pub property: &'static str,
    pub value: EntityKind,
}

/// Body of a `POST /search` request.
///
/// A query without `start_cursor` always asks for the first page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    pub filter: SearchFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl SearchQuery {
    pub fn for_kind(kind: EntityKind) -> Self {
        Self {
            filter: SearchFilter {
                property: "object",
                value: kind,
            },
            start_cursor: None,
            page_size: None,
        }
    }

    /// Same query, resumed at `cursor`.
    pub fn with_cursor(&self, cursor: impl Into<String>) -> Self {
        Self {
            start_cursor: Some(cursor.into()),
            ..self.clone()
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.filter.value
    }
}

/// A page or database record. Everything except `id` is carried verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchResultPage {
    pub results: Vec<Entity>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Error body returned by the API on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}
