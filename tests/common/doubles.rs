//! Publisher and store doubles

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use xfchat::backend::realtime::{PublishError, Publisher};
use xfchat::backend::store::{OrderedLog, StoreError};

/// One successful publish
#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub channel: String,
    pub event: String,
    pub payload: Value,
}

/// Forwards to an inner publisher and records the publishes it accepts
///
/// The first `failures` calls fail with a retryable error and are neither
/// recorded nor forwarded. Calls the inner publisher rejects count as
/// attempts but are not recorded.
pub struct RecordingPublisher {
    inner: Arc<dyn Publisher>,
    failures: u32,
    attempts: AtomicU32,
    published: Mutex<Vec<Published>>,
}

impl RecordingPublisher {
    pub fn new(inner: Arc<dyn Publisher>, failures: u32) -> Self {
        Self {
            inner,
            failures,
            attempts: AtomicU32::new(0),
            published: Mutex::new(Vec::new()),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn published(&self) -> Vec<Published> {
        self.published.lock().unwrap().clone()
    }

    /// Poll until at least `count` publishes were recorded
    pub async fn wait_for(&self, count: usize) -> Vec<Published> {
        for _ in 0..400 {
            let published = self.published();
            if published.len() >= count {
                return published;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!(
            "expected {} publishes, got {:?}",
            count,
            self.published()
        );
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, channel: &str, event: &str, payload: Value) -> Result<(), PublishError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.failures {
            return Err(PublishError::unavailable("broker unreachable"));
        }

        self.inner.publish(channel, event, payload.clone()).await?;
        self.published.lock().unwrap().push(Published {
            channel: channel.to_string(),
            event: event.to_string(),
            payload,
        });
        Ok(())
    }
}

/// An ordered log whose writes always fail
pub struct FailingLog;

#[async_trait]
impl OrderedLog for FailingLog {
    async fn append(&self, _: &str, _: i64, _: &str) -> Result<(), StoreError> {
        Err(StoreError::upstream("ERR disk full"))
    }

    async fn range_by_score(&self, _: &str, _: i64, _: i64) -> Result<Vec<String>, StoreError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xfchat::backend::realtime::{ChannelHub, MAX_PAYLOAD_BYTES};

    #[tokio::test]
    async fn test_recording_publisher_skips_rejected_publishes() {
        let publisher = RecordingPublisher::new(Arc::new(ChannelHub::new()), 0);

        let oversized = serde_json::json!({"text": "x".repeat(MAX_PAYLOAD_BYTES)});
        assert!(publisher.publish("chat__u1--u2", "incoming-message", oversized).await.is_err());
        assert!(publisher.publish("bad channel!", "incoming-message", Value::Null).await.is_err());
        assert!(publisher.published().is_empty());

        publisher
            .publish("chat__u1--u2", "incoming-message", serde_json::json!({"text": "hi"}))
            .await
            .unwrap();
        assert_eq!(publisher.attempts(), 3);
        assert_eq!(publisher.published().len(), 1);
    }
}
