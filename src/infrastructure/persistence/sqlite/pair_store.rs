//! # SQLite Pair Store
//!
//! SQLite implementation of [`PairRepository`] using sqlx.
//!
//! The store owns schema management: opening it creates the database file
//! if needed, verifies connectivity, applies the write-ahead-log and
//! relaxed-flush tunables, and ensures the `soroswap_pairs` table and its
//! token index exist. Any failure during open is fatal to initialization;
//! there is no partial-degradation mode.
//!
//! Durability note: WAL with `synchronous = NORMAL` trades a window of
//! crash durability for write throughput. The pair table is indexing data
//! derived from chain events, not the source of truth, so a lost tail of
//! writes is recoverable by replay.

use crate::domain::events::SyncEvent;
use crate::domain::pair::Pair;
use crate::infrastructure::persistence::traits::{
    PairRepository, RepositoryError, RepositoryResult, SyncOutcome, UpsertOutcome,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;
use tracing::info;

/// DDL for the pair table.
///
/// The CHECK constraints back up the domain-level validation: identity
/// fields can never be empty, even if a row is written through another
/// connection.
const CREATE_PAIRS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS soroswap_pairs (
    pair_address TEXT NOT NULL PRIMARY KEY,
    token_0 TEXT NOT NULL,
    token_1 TEXT NOT NULL,
    reserve_0 TEXT NOT NULL DEFAULT '0',
    reserve_1 TEXT NOT NULL DEFAULT '0',
    created_at TIMESTAMP NOT NULL,
    last_sync_at TIMESTAMP,
    last_sync_ledger INTEGER,

    CHECK (length(pair_address) > 0),
    CHECK (length(token_0) > 0),
    CHECK (length(token_1) > 0)
)
"#;

/// Secondary index for token-based lookups.
const CREATE_TOKENS_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_soroswap_pairs_tokens
ON soroswap_pairs (token_0, token_1)
"#;

/// SQLite implementation of [`PairRepository`].
///
/// Holds a single-connection `sqlx::SqlitePool`: SQLite is single-writer
/// and the consumer is invoked one event at a time, so one connection
/// serializes all writes without an application-level lock.
///
/// # Examples
///
/// ```ignore
/// use soroswap_pairs::infrastructure::persistence::sqlite::SqlitePairStore;
///
/// let store = SqlitePairStore::open("soroswap_pairs.sqlite").await?;
/// ```
#[derive(Debug, Clone)]
pub struct SqlitePairStore {
    pool: SqlitePool,
}

impl SqlitePairStore {
    /// Opens or creates the database at `path` and ensures the schema.
    ///
    /// Configures WAL journaling with `synchronous = NORMAL`, verifies
    /// connectivity with a ping, and applies the table and index DDL.
    /// The path `":memory:"` opens an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Connection`] if the database cannot be
    /// opened, configured, or pinged, and [`RepositoryError::Schema`] if
    /// the DDL fails.
    pub async fn open(path: &str) -> RepositoryResult<Self> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| RepositoryError::connection(format!("invalid database path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        // A single connection held open for the lifetime of the store.
        // Idle reaping is disabled so an in-memory database survives
        // between calls.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| RepositoryError::connection(format!("failed to open sqlite: {e}")))?;

        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map_err(|e| RepositoryError::connection(format!("failed to ping sqlite: {e}")))?;

        let store = Self { pool };
        store.ensure_schema().await?;

        info!(path, "sqlite pair store initialized");
        Ok(store)
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the pool, releasing the database handle.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Ensures the pair table and token index exist.
    async fn ensure_schema(&self) -> RepositoryResult<()> {
        sqlx::query(CREATE_PAIRS_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                RepositoryError::schema(format!("failed to create soroswap_pairs table: {e}"))
            })?;

        sqlx::query(CREATE_TOKENS_INDEX)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                RepositoryError::schema(format!("failed to create tokens index: {e}"))
            })?;

        Ok(())
    }
}

#[async_trait]
impl PairRepository for SqlitePairStore {
    async fn insert(&self, pair: &Pair) -> RepositoryResult<UpsertOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::query(format!("failed to begin transaction: {e}")))?;

        let result = sqlx::query(
            r#"
            INSERT INTO soroswap_pairs (
                pair_address, token_0, token_1, created_at,
                reserve_0, reserve_1
            ) VALUES (?, ?, ?, ?, '0', '0')
            ON CONFLICT (pair_address) DO NOTHING
            "#,
        )
        .bind(&pair.pair_address)
        .bind(&pair.token_0)
        .bind(&pair.token_1)
        .bind(pair.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::query(format!("failed to insert pair: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::query(format!("failed to commit transaction: {e}")))?;

        if result.rows_affected() == 0 {
            Ok(UpsertOutcome::AlreadyExists)
        } else {
            Ok(UpsertOutcome::Inserted)
        }
    }

    async fn apply_sync(&self, event: &SyncEvent) -> RepositoryResult<SyncOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::query(format!("failed to begin transaction: {e}")))?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM soroswap_pairs WHERE pair_address = ?)",
        )
        .bind(&event.contract_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::query(format!("failed to check pair existence: {e}")))?;

        if !exists {
            // Transaction dropped here; nothing was written.
            return Ok(SyncOutcome::UnknownPair);
        }

        sqlx::query(
            r#"
            UPDATE soroswap_pairs
            SET reserve_0 = ?,
                reserve_1 = ?,
                last_sync_at = ?,
                last_sync_ledger = ?
            WHERE pair_address = ?
            "#,
        )
        .bind(&event.new_reserve_0)
        .bind(&event.new_reserve_1)
        .bind(event.timestamp)
        .bind(event.ledger_sequence)
        .bind(&event.contract_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::query(format!("failed to update pair reserves: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::query(format!("failed to commit transaction: {e}")))?;

        Ok(SyncOutcome::Applied)
    }

    async fn get(&self, pair_address: &str) -> RepositoryResult<Option<Pair>> {
        let row: Option<PairRow> = sqlx::query_as(
            r#"
            SELECT pair_address, token_0, token_1, reserve_0, reserve_1,
                   created_at, last_sync_at, last_sync_ledger
            FROM soroswap_pairs
            WHERE pair_address = ?
            "#,
        )
        .bind(pair_address)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::query(format!("failed to fetch pair: {e}")))?;

        Ok(row.map(PairRow::into_pair))
    }

    async fn count(&self) -> RepositoryResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM soroswap_pairs")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::query(format!("failed to count pairs: {e}")))?;

        Ok(count as u64)
    }
}

/// Row type for pair queries.
#[derive(Debug, sqlx::FromRow)]
struct PairRow {
    pair_address: String,
    token_0: String,
    token_1: String,
    reserve_0: String,
    reserve_1: String,
    created_at: DateTime<Utc>,
    last_sync_at: Option<DateTime<Utc>>,
    last_sync_ledger: Option<i64>,
}

impl PairRow {
    /// Converts the row into a domain pair.
    ///
    /// Rows come from the checked table, so no re-validation is needed.
    fn into_pair(self) -> Pair {
        Pair {
            pair_address: self.pair_address,
            token_0: self.token_0,
            token_1: self.token_1,
            reserve_0: self.reserve_0,
            reserve_1: self.reserve_1,
            created_at: self.created_at,
            last_sync_at: self.last_sync_at,
            last_sync_ledger: self.last_sync_ledger,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn open_store() -> SqlitePairStore {
        SqlitePairStore::open(":memory:").await.unwrap()
    }

    fn test_pair(address: &str) -> Pair {
        Pair::new(address, "TOKEN_A", "TOKEN_B", ts("2024-01-01T00:00:00Z")).unwrap()
    }

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn sync_event(contract_id: &str, ledger: i64) -> SyncEvent {
        SyncEvent {
            contract_id: contract_id.to_string(),
            new_reserve_0: "100".to_string(),
            new_reserve_1: "50".to_string(),
            timestamp: ts("2024-01-01T01:00:00Z"),
            ledger_sequence: ledger,
        }
    }

    #[tokio::test]
    async fn insert_creates_row_with_default_reserves() {
        let store = open_store().await;
        let pair = test_pair("P1");

        let outcome = store.insert(&pair).await.unwrap();
        assert!(outcome.is_inserted());

        let stored = store.get("P1").await.unwrap().unwrap();
        assert_eq!(stored.pair_address, "P1");
        assert_eq!(stored.token_0, "TOKEN_A");
        assert_eq!(stored.token_1, "TOKEN_B");
        assert_eq!(stored.reserve_0, "0");
        assert_eq!(stored.reserve_1, "0");
        assert_eq!(stored.created_at, ts("2024-01-01T00:00:00Z"));
        assert!(stored.last_sync_at.is_none());
        assert!(stored.last_sync_ledger.is_none());
    }

    #[tokio::test]
    async fn duplicate_insert_is_a_noop() {
        let store = open_store().await;
        let pair = test_pair("P1");

        assert!(store.insert(&pair).await.unwrap().is_inserted());

        // A second delivery with different tokens must not touch the row.
        let duplicate =
            Pair::new("P1", "OTHER_A", "OTHER_B", ts("2025-06-01T00:00:00Z")).unwrap();
        let outcome = store.insert(&duplicate).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::AlreadyExists);

        assert_eq!(store.count().await.unwrap(), 1);
        let stored = store.get("P1").await.unwrap().unwrap();
        assert_eq!(stored.token_0, "TOKEN_A");
        assert_eq!(stored.token_1, "TOKEN_B");
        assert_eq!(stored.created_at, ts("2024-01-01T00:00:00Z"));
    }

    #[tokio::test]
    async fn distinct_addresses_insert_distinct_rows() {
        let store = open_store().await;

        assert!(store.insert(&test_pair("P1")).await.unwrap().is_inserted());
        assert!(store.insert(&test_pair("P2")).await.unwrap().is_inserted());

        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn sync_for_unknown_pair_leaves_table_unchanged() {
        let store = open_store().await;

        let outcome = store.apply_sync(&sync_event("UNKNOWN", 42)).await.unwrap();
        assert_eq!(outcome, SyncOutcome::UnknownPair);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn sync_updates_only_mutable_fields() {
        let store = open_store().await;
        store.insert(&test_pair("P1")).await.unwrap();

        let outcome = store.apply_sync(&sync_event("P1", 42)).await.unwrap();
        assert!(outcome.is_applied());

        let stored = store.get("P1").await.unwrap().unwrap();
        assert_eq!(stored.reserve_0, "100");
        assert_eq!(stored.reserve_1, "50");
        assert_eq!(stored.last_sync_at, Some(ts("2024-01-01T01:00:00Z")));
        assert_eq!(stored.last_sync_ledger, Some(42));

        // Identity fields and created_at are untouched.
        assert_eq!(stored.token_0, "TOKEN_A");
        assert_eq!(stored.token_1, "TOKEN_B");
        assert_eq!(stored.created_at, ts("2024-01-01T00:00:00Z"));
    }

    #[tokio::test]
    async fn older_ledger_sync_still_overwrites() {
        // Ledger ordering is not enforced: a late-arriving older sync
        // replaces newer reserves. Documented passthrough behavior.
        let store = open_store().await;
        store.insert(&test_pair("P1")).await.unwrap();

        store.apply_sync(&sync_event("P1", 42)).await.unwrap();
        store.apply_sync(&sync_event("P1", 41)).await.unwrap();

        let stored = store.get("P1").await.unwrap().unwrap();
        assert_eq!(stored.last_sync_ledger, Some(41));
    }

    #[tokio::test]
    async fn get_nonexistent_returns_none() {
        let store = open_store().await;
        assert!(store.get("MISSING").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reopen_retains_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pairs.sqlite");
        let path = path.to_str().unwrap();

        let store = SqlitePairStore::open(path).await.unwrap();
        store.insert(&test_pair("P1")).await.unwrap();
        store.close().await;

        let reopened = SqlitePairStore::open(path).await.unwrap();
        let stored = reopened.get("P1").await.unwrap();
        assert!(stored.is_some());
        reopened.close().await;
    }

    #[tokio::test]
    async fn schema_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pairs.sqlite");
        let path = path.to_str().unwrap();

        let first = SqlitePairStore::open(path).await.unwrap();
        first.close().await;

        // Second open re-runs the DDL against the existing schema.
        let second = SqlitePairStore::open(path).await.unwrap();
        assert_eq!(second.count().await.unwrap(), 0);
        second.close().await;
    }

    #[tokio::test]
    async fn open_fails_for_unwritable_path() {
        let result = SqlitePairStore::open("/nonexistent-dir/pairs.sqlite").await;
        assert!(matches!(result, Err(RepositoryError::Connection(_))));
    }
}
