// notionbackup/src/backup/content.rs
use anyhow::Result;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::notion::WorkspaceApi;
use crate::retry::{RetryOutcome, RetryPolicy};

/// Page id -> block children, in fetch order.
pub type ContentMapping = IndexMap<String, Value>;

/// Fetches the content of every page in `ids`, one at a time and in order.
///
/// Each fetch has its own retry budget. The first fetch that exhausts it
/// aborts the whole aggregation with that fetch's error, and the partial
/// mapping is dropped.
pub async fn aggregate<A>(api: &A, ids: &[&str], policy: &RetryPolicy) -> Result<ContentMapping>
where
    A: WorkspaceApi + ?Sized,
{
    let mut mapping = ContentMapping::with_capacity(ids.len());

    for (index, &id) in ids.iter().enumerate() {
        debug!("fetching content {}/{}: {}", index + 1, ids.len(), id);
        let label = format!("block children of {}", id);
        match policy.run(&label, || api.list_block_children(id)).await {
            RetryOutcome::Completed(content) => {
                mapping.insert(id.to_string(), content);
            }
            RetryOutcome::Exhausted { attempts, error } => {
                warn!(
                    "content of page {} failed after {} attempts, {} of {} pages fetched",
                    id,
                    attempts,
                    mapping.len(),
                    ids.len()
                );
                return Err(error);
            }
        }
    }

    Ok(mapping)
}
