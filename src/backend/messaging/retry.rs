//! # Publish Retry Queue
//!
//! A message is durable once it is in the ordered log, so a failed publish
//! must not fail the send request. Failed publishes are handed to this queue
//! and retried in the background with exponential backoff.
//!
//! ## Backoff
//!
//! Retry `n` (1-based) waits `base_delay * 2^(n-1)`, capped at `max_delay`.
//! `max_attempts` counts every attempt including the inline one made by the
//! handler, so a policy with `max_attempts = 5` retries at most four times.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::backend::realtime::Publisher;

/// Backoff configuration for publish retries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the inline one included
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based)
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(31);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    pub fn retries(&self) -> u32 {
        self.max_attempts.saturating_sub(1)
    }
}

/// A publish that failed inline and is waiting to be retried
#[derive(Debug, Clone)]
pub struct PendingPublish {
    pub channel: String,
    pub event: String,
    pub payload: Value,
}

/// Handle to the background retry worker
///
/// Cloning is cheap; all clones feed the same worker.
#[derive(Clone)]
pub struct PublishRetryQueue {
    tx: mpsc::UnboundedSender<PendingPublish>,
}

impl PublishRetryQueue {
    /// Start the worker on the current tokio runtime
    pub fn spawn(publisher: Arc<dyn Publisher>, policy: RetryPolicy) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<PendingPublish>();

        tokio::spawn(async move {
            while let Some(pending) = rx.recv().await {
                tokio::spawn(retry_publish(publisher.clone(), policy, pending));
            }
            tracing::debug!("[Retry] Queue closed, worker stopping");
        });

        Self { tx }
    }

    /// Queue a publish for retry; `false` if the worker is gone
    pub fn enqueue(&self, pending: PendingPublish) -> bool {
        match self.tx.send(pending) {
            Ok(()) => true,
            Err(mpsc::error::SendError(pending)) => {
                tracing::error!(
                    "[Retry] Worker unavailable, dropping {} on {}",
                    pending.event,
                    pending.channel
                );
                false
            }
        }
    }
}

/// Retry one publish until it succeeds or the policy is exhausted
async fn retry_publish(publisher: Arc<dyn Publisher>, policy: RetryPolicy, pending: PendingPublish) -> bool {
    for retry in 1..=policy.retries() {
        tokio::time::sleep(policy.delay_for_retry(retry)).await;

        match publisher
            .publish(&pending.channel, &pending.event, pending.payload.clone())
            .await
        {
            Ok(()) => {
                tracing::info!(
                    "[Retry] {} on {} delivered on retry {}",
                    pending.event,
                    pending.channel,
                    retry
                );
                return true;
            }
            Err(e) if e.is_retryable() => {
                tracing::warn!(
                    "[Retry] {} on {} failed on retry {}/{}: {}",
                    pending.event,
                    pending.channel,
                    retry,
                    policy.retries(),
                    e
                );
            }
            Err(e) => {
                tracing::error!(
                    "[Retry] {} on {} failed permanently: {}",
                    pending.event,
                    pending.channel,
                    e
                );
                return false;
            }
        }
    }

    tracing::error!(
        "[Retry] Giving up on {} for {} after {} attempts",
        pending.event,
        pending.channel,
        policy.max_attempts
    );
    false
}
