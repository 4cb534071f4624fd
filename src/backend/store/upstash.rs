/**
 * Upstash Redis REST Store
 *
 * Talks to an Upstash Redis database over its REST API. Every command is a
 * `POST` of a JSON array (`["SMEMBERS", "user:u1:friends"]`) to the database
 * URL with a bearer token; the reply is `{"result": ...}` on success or
 * `{"error": "..."}` on failure.
 */

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use super::{KeyValueStore, OrderedLog, StoreError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct UpstashReply {
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    error: Option<String>,
}

/// Key-value store and ordered log backed by Upstash Redis
#[derive(Clone)]
pub struct UpstashStore {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl UpstashStore {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Run one Redis command and decode its `result`
    async fn command<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T, StoreError> {
        let command = args.first().copied().unwrap_or_default();
        tracing::debug!("[Store] Upstash {}", command);

        let reply = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.token)
            .json(&args)
            .send()
            .await?
            .json::<UpstashReply>()
            .await?;

        if let Some(error) = reply.error {
            tracing::warn!("[Store] Upstash {} failed: {}", command, error);
            return Err(StoreError::upstream(error));
        }

        serde_json::from_value(reply.result).map_err(|e| {
            StoreError::upstream(format!("unexpected {} result: {}", command, e))
        })
    }
}

#[async_trait]
impl KeyValueStore for UpstashStore {
    async fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError> {
        self.command(&["SMEMBERS", key]).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.command(&["GET", key]).await
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let added: i64 = self.command(&["SADD", key, member]).await?;
        Ok(added > 0)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _: String = self.command(&["SET", key, value]).await?;
        Ok(())
    }
}

#[async_trait]
impl OrderedLog for UpstashStore {
    async fn append(&self, key: &str, score: i64, member: &str) -> Result<(), StoreError> {
        let score = score.to_string();
        let _: i64 = self.command(&["ZADD", key, &score, member]).await?;
        Ok(())
    }

    async fn range_by_score(
        &self,
        key: &str,
        min: i64,
        max: i64,
    ) -> Result<Vec<String>, StoreError> {
        let (min, max) = (min.to_string(), max.to_string());
        self.command(&["ZRANGEBYSCORE", key, &min, &max]).await
    }
}
