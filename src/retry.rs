//! Bounded retry around fallible async operations.
//!
//! A [`RetryPolicy`] never raises once its budget is spent: the last failure
//! comes back as [`RetryOutcome::Exhausted`] and the caller decides whether to
//! propagate it, record it, or carry on.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Retry budget and fixed inter-attempt delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts beyond the first one. `0` means try exactly once.
    pub retries: u32,
    pub delay: Duration,
}

/// Result of running an operation under a [`RetryPolicy`].
#[must_use = "an exhausted retry carries the failure and must be inspected"]
#[derive(Debug)]
pub enum RetryOutcome<T> {
    Completed(T),
    Exhausted { attempts: u32, error: anyhow::Error },
}

impl<T> RetryOutcome<T> {
    /// Turns exhaustion back into an ordinary error for `?` propagation.
    pub fn into_result(self) -> anyhow::Result<T> {
        match self {
            RetryOutcome::Completed(value) => Ok(value),
            RetryOutcome::Exhausted { error, .. } => Err(error),
        }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    /// Runs `op` until it succeeds or the budget is spent.
    ///
    /// `op` is called again with whatever it captured, so every attempt sees
    /// the same arguments. The delay is only observed between attempts.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> RetryOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let mut remaining = self.retries;
        let mut attempt: u32 = 1;

        loop {
            debug!("requesting {} (attempt {})", label, attempt);
            match op().await {
                Ok(value) => return RetryOutcome::Completed(value),
                Err(error) if remaining == 0 => {
                    return RetryOutcome::Exhausted {
                        attempts: attempt,
                        error,
                    };
                }
                Err(error) => {
                    remaining -= 1;
                    info!(
                        "{} failed, wait for {} ms, remain times {}: {}",
                        label,
                        self.delay.as_millis(),
                        remaining,
                        error
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
