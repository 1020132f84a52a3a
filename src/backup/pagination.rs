// notionbackup/src/backup/pagination.rs
use anyhow::Result;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::notion::{Entity, SearchQuery, WorkspaceApi};
use crate::retry::{RetryOutcome, RetryPolicy};

/// Follows `next_cursor` from `query` until the search is exhausted.
///
/// Pages are concatenated in request order. Errors are not caught here: a
/// failure on any page fails the whole traversal.
pub async fn fetch_all<A>(api: &A, query: SearchQuery) -> Result<Vec<Entity>>
where
    A: WorkspaceApi + ?Sized,
{
    let mut entities = Vec::new();
    let mut current = query;

    loop {
        let page = api.search(&current).await?;
        entities.extend(page.results);

        if !page.has_more {
            debug!(
                "no more search results for {} (total {})",
                current.kind().as_str(),
                entities.len()
            );
            return Ok(entities);
        }

        let cursor = match page.next_cursor {
            Some(cursor) if !cursor.is_empty() => cursor,
            _ => {
                return Err(AppError::Protocol(
                    "search response has_more=true without next_cursor".to_string(),
                )
                .into());
            }
        };
        debug!("load more, cursor: {}", cursor);
        current = current.with_cursor(cursor);
    }
}

/// Runs a full traversal under `policy`. A failed page restarts the search
/// from the first page on the next attempt.
pub async fn search_with_retry<A>(
    api: &A,
    query: SearchQuery,
    policy: &RetryPolicy,
) -> Result<Vec<Entity>>
where
    A: WorkspaceApi + ?Sized,
{
    let label = format!("search {}", query.kind().as_str());
    let outcome = policy.run(&label, || fetch_all(api, query.clone())).await;
    if let RetryOutcome::Exhausted { attempts, error } = &outcome {
        warn!("{} gave up after {} attempts: {:#}", label, attempts, error);
    }
    outcome.into_result()
}
