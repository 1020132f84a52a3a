// notionbackup/src/notion/client.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Proxy, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::types::{ApiErrorBody, SearchQuery, SearchResultPage};
use super::WorkspaceApi;
use crate::config::AppConfig;
use crate::errors::AppError;

pub const NOTION_VERSION: &str = "2022-06-28";

/// HTTP client for the Notion REST API.
pub struct NotionClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl NotionClient {
    pub fn new(
        base_url: Url,
        token: impl Into<String>,
        timeout: Duration,
        proxy: Option<&Url>,
    ) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("notionbackup/", env!("CARGO_PKG_VERSION")));

        if let Some(proxy_url) = proxy {
            let proxy = Proxy::all(proxy_url.as_str())
                .with_context(|| format!("Invalid proxy URL: {}", proxy_url))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(AppError::Reqwest)
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            token: token.into(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            config.token.clone(),
            config.client_timeout,
            config.proxy.as_ref(),
        )
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(AppError::UrlParse)
            .with_context(|| format!("Failed to build endpoint URL for {}", path))
    }

    /// Maps non-2xx responses to [`AppError::Api`].
    async fn check_status(response: Response) -> Result<Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(err) if !err.message.is_empty() => (err.code, err.message),
            _ => (
                status.canonical_reason().unwrap_or("unknown").to_string(),
                body,
            ),
        };

        Err(AppError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }
}

#[async_trait]
impl WorkspaceApi for NotionClient {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResultPage> {
        let url = self.endpoint("search")?;
        debug!(
            "POST {} (filter: {}, cursor: {:?})",
            url,
            query.kind().as_str(),
            query.start_cursor
        );

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(query)
            .send()
            .await
            .map_err(AppError::Reqwest)
            .context("Failed to send search request")?;

        let page: SearchResultPage = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(AppError::Reqwest)
            .context("Failed to parse search response")?;

        if page.has_more && page.next_cursor.as_deref().is_none_or(str::is_empty) {
            return Err(AppError::Protocol(
                "search response has_more=true without next_cursor".to_string(),
            )
            .into());
        }

        Ok(page)
    }

    async fn list_block_children(&self, block_id: &str) -> Result<Value> {
        let url = self.endpoint(&format!("blocks/{}/children", block_id))?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await
            .map_err(AppError::Reqwest)
            .with_context(|| format!("Failed to request children of block {}", block_id))?;

        let content: Value = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(AppError::Reqwest)
            .with_context(|| format!("Failed to parse children of block {}", block_id))?;

        Ok(content)
    }
}
