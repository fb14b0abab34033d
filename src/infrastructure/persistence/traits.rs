//! # Repository Traits
//!
//! Port definition for pair persistence.
//!
//! This module defines the [`PairRepository`] trait (port) that abstracts
//! the write path for liquidity-pair state, plus the outcome and error
//! types its operations report. The production implementation is
//! [`SqlitePairStore`](super::sqlite::SqlitePairStore).

use crate::domain::events::SyncEvent;
use crate::domain::pair::Pair;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Error type for repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The store could not be opened, pinged, or configured.
    #[error("connection error: {0}")]
    Connection(String),

    /// Schema initialization failed.
    #[error("schema error: {0}")]
    Schema(String),

    /// A statement or transaction failed.
    #[error("query error: {0}")]
    Query(String),
}

impl RepositoryError {
    /// Creates a connection error.
    #[must_use]
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a schema error.
    #[must_use]
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Creates a query error.
    #[must_use]
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Returns true if this is a connection error.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Outcome of an idempotent pair insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new row was inserted.
    Inserted,
    /// A row with the same pair address already existed; nothing was written.
    AlreadyExists,
}

impl UpsertOutcome {
    /// Returns true if a new row was inserted.
    #[must_use]
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted)
    }
}

/// Outcome of a reserve sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The pair existed and its reserves were updated.
    Applied,
    /// No pair with the given address exists; nothing was written.
    UnknownPair,
}

impl SyncOutcome {
    /// Returns true if the update was applied.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Repository for liquidity-pair records.
///
/// Each write operation runs inside a single transaction: it either takes
/// full effect or leaves the row set unchanged. Rows are never deleted
/// through this port.
#[async_trait]
pub trait PairRepository: Send + Sync + fmt::Debug {
    /// Inserts a pair, ignoring the write if one already exists for the
    /// same `pair_address`.
    ///
    /// The existing row always wins: a duplicate insert never updates
    /// tokens, reserves, or `created_at`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Query`] if the transaction cannot be
    /// started, executed, or committed.
    async fn insert(&self, pair: &Pair) -> RepositoryResult<UpsertOutcome>;

    /// Applies a reserve sync to an existing pair.
    ///
    /// Checks for the pair's existence first; if it is unknown, returns
    /// [`SyncOutcome::UnknownPair`] without mutating anything. Otherwise
    /// updates `reserve_0`, `reserve_1`, `last_sync_at`, and
    /// `last_sync_ledger` in one statement.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Query`] if the transaction cannot be
    /// started, executed, or committed.
    async fn apply_sync(&self, event: &SyncEvent) -> RepositoryResult<SyncOutcome>;

    /// Gets a pair by address.
    ///
    /// Returns `None` if the pair does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Query`] if the lookup fails.
    async fn get(&self, pair_address: &str) -> RepositoryResult<Option<Pair>>;

    /// Counts all pairs.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Query`] if the count fails.
    async fn count(&self) -> RepositoryResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_error() {
        let err = RepositoryError::connection("unable to open database file");
        assert!(err.is_connection());
        assert!(err.to_string().contains("connection"));
        assert!(err.to_string().contains("unable to open"));
    }

    #[test]
    fn schema_error() {
        let err = RepositoryError::schema("CREATE TABLE failed");
        assert!(!err.is_connection());
        assert!(err.to_string().contains("schema"));
    }

    #[test]
    fn query_error() {
        let err = RepositoryError::query("constraint violated");
        assert!(err.to_string().contains("query"));
        assert!(err.to_string().contains("constraint"));
    }

    #[test]
    fn upsert_outcome_predicates() {
        assert!(UpsertOutcome::Inserted.is_inserted());
        assert!(!UpsertOutcome::AlreadyExists.is_inserted());
    }

    #[test]
    fn sync_outcome_predicates() {
        assert!(SyncOutcome::Applied.is_applied());
        assert!(!SyncOutcome::UnknownPair.is_applied());
    }
}
