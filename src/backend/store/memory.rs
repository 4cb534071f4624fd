/**
 * In-Memory Store
 *
 * Implements both store traits on top of `tokio::sync::RwLock`-guarded maps.
 * Nothing survives a restart; this backend exists for local development and
 * for tests that need to seed friends and profiles directly.
 */

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap, HashSet};
use tokio::sync::RwLock;

use super::{KeyValueStore, OrderedLog, StoreError};

/// One sorted log: score lookup by member plus the ordered index
#[derive(Debug, Default)]
struct SortedLog {
    scores: HashMap<String, i64>,
    ordered: BTreeSet<(i64, String)>,
}

impl SortedLog {
    fn insert(&mut self, score: i64, member: &str) {
        if let Some(previous) = self.scores.insert(member.to_string(), score) {
            self.ordered.remove(&(previous, member.to_string()));
        }
        self.ordered.insert((score, member.to_string()));
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
    sets: RwLock<HashMap<String, HashSet<String>>>,
    logs: RwLock<HashMap<String, SortedLog>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in the log at `key`
    pub async fn log_len(&self, key: &str) -> usize {
        self.logs
            .read()
            .await
            .get(key)
            .map(|log| log.ordered.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let sets = self.sets.read().await;
        Ok(sets
            .get(key)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let mut sets = self.sets.write().await;
        Ok(sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[async_trait]
impl OrderedLog for MemoryStore {
    async fn append(&self, key: &str, score: i64, member: &str) -> Result<(), StoreError> {
        let mut logs = self.logs.write().await;
        logs.entry(key.to_string()).or_default().insert(score, member);
        Ok(())
    }

    async fn range_by_score(
        &self,
        key: &str,
        min: i64,
        max: i64,
    ) -> Result<Vec<String>, StoreError> {
        let logs = self.logs.read().await;
        Ok(logs
            .get(key)
            .map(|log| {
                log.ordered
                    .iter()
                    .filter(|(score, _)| *score >= min && *score <= max)
                    .map(|(_, member)| member.clone())
                    .collect()
            })
            .unwrap_or_default())
    }
}
