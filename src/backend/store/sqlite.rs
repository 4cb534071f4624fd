/**
 * SQLite Store
 *
 * Durable backend built on a `sqlx` SQLite pool. Three tables model the
 * Redis structures the handlers expect:
 *
 * - `kv_values`    - string values (`GET` / `SET`)
 * - `set_members`  - set membership (`SMEMBERS` / `SADD`)
 * - `sorted_logs`  - scored members (`ZADD` / `ZRANGEBYSCORE`)
 *
 * Tables are created on connect, so a fresh database file is usable
 * immediately.
 */

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use super::{KeyValueStore, OrderedLog, StoreError};

/// SQLite-backed key-value store and ordered log
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to `database_url` and create the tables
    ///
    /// The database file is created when missing.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Self::from_pool(pool).await
    }

    /// Private in-memory database, mainly for tests
    ///
    /// Every SQLite connection to `:memory:` opens its own database, so the
    /// pool is pinned to a single connection.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        Self::init(&pool).await?;
        Ok(Self { pool })
    }

    async fn init(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv_values (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS set_members (
                key    TEXT NOT NULL,
                member TEXT NOT NULL,
                PRIMARY KEY (key, member)
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS sorted_logs (
                key    TEXT    NOT NULL,
                score  INTEGER NOT NULL,
                member TEXT    NOT NULL,
                PRIMARY KEY (key, member)
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_sorted_logs_key_score
             ON sorted_logs (key, score)",
        )
        .execute(pool)
        .await?;

        tracing::debug!("[Store] SQLite tables ready");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let members = sqlx::query_scalar::<_, String>(
            "SELECT member FROM set_members WHERE key = ? ORDER BY member",
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_values WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("INSERT OR IGNORE INTO set_members (key, member) VALUES (?, ?)")
            .bind(key)
            .bind(member)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO kv_values (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl OrderedLog for SqliteStore {
    async fn append(&self, key: &str, score: i64, member: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO sorted_logs (key, score, member) VALUES (?, ?, ?)
             ON CONFLICT(key, member) DO UPDATE SET score = excluded.score",
        )
        .bind(key)
        .bind(score)
        .bind(member)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn range_by_score(
        &self,
        key: &str,
        min: i64,
        max: i64,
    ) -> Result<Vec<String>, StoreError> {
        let members = sqlx::query_scalar::<_, String>(
            "SELECT member FROM sorted_logs
             WHERE key = ? AND score >= ? AND score <= ?
             ORDER BY score ASC, member ASC",
        )
        .bind(key)
        .bind(min)
        .bind(max)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }
}
