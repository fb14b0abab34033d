//! # Pair Entity
//!
//! The persisted liquidity-pair record.
//!
//! A [`Pair`] is created exactly once by a `new_pair` event and mutated zero
//! or more times by `sync` events. Construction validates the identity
//! fields; reserve strings are opaque and never interpreted.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::events::NewPairEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked liquidity pair between two token identities.
///
/// # Invariants
///
/// - `pair_address`, `token_0`, `token_1` are never empty
/// - `token_0`, `token_1`, `created_at` are immutable after creation
/// - reserves are only updated together with `last_sync_at` and
///   `last_sync_ledger`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    /// Contract address identifying the pair. Primary identity key.
    pub pair_address: String,
    /// First token in the pair.
    pub token_0: String,
    /// Second token in the pair.
    pub token_1: String,
    /// Current reserve of the first token, decimal-as-string.
    pub reserve_0: String,
    /// Current reserve of the second token, decimal-as-string.
    pub reserve_1: String,
    /// When the pair was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recent successful reserve sync, if any.
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Ledger sequence of the most recent sync, if any.
    pub last_sync_ledger: Option<i64>,
}

impl Pair {
    /// Initial reserve value for a freshly created pair.
    pub const DEFAULT_RESERVE: &'static str = "0";

    /// Creates a new pair with reserves defaulted to `"0"`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyField`] if `pair_address`, `token_0`, or
    /// `token_1` is empty.
    pub fn new(
        pair_address: impl Into<String>,
        token_0: impl Into<String>,
        token_1: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let pair_address = pair_address.into();
        let token_0 = token_0.into();
        let token_1 = token_1.into();

        if pair_address.is_empty() {
            return Err(DomainError::empty_field("pair_address"));
        }
        if token_0.is_empty() {
            return Err(DomainError::empty_field("token_0"));
        }
        if token_1.is_empty() {
            return Err(DomainError::empty_field("token_1"));
        }

        Ok(Self {
            pair_address,
            token_0,
            token_1,
            reserve_0: Self::DEFAULT_RESERVE.to_string(),
            reserve_1: Self::DEFAULT_RESERVE.to_string(),
            created_at,
            last_sync_at: None,
            last_sync_ledger: None,
        })
    }

    /// Creates a pair from a `new_pair` event.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyField`] if any identity field of the
    /// event is empty.
    pub fn from_event(event: &NewPairEvent) -> DomainResult<Self> {
        Self::new(
            event.pair_address.clone(),
            event.token_0.clone(),
            event.token_1.clone(),
            event.timestamp,
        )
    }

    /// Returns true if this pair has received at least one reserve sync.
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.last_sync_at.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn created_at() -> DateTime<Utc> {
        "2024-01-01T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn new_pair_defaults_reserves_to_zero() {
        let pair = Pair::new("P1", "A", "B", created_at()).unwrap();
        assert_eq!(pair.reserve_0, "0");
        assert_eq!(pair.reserve_1, "0");
        assert!(pair.last_sync_at.is_none());
        assert!(pair.last_sync_ledger.is_none());
        assert!(!pair.is_synced());
    }

    #[test]
    fn empty_pair_address_is_rejected() {
        let err = Pair::new("", "A", "B", created_at()).unwrap_err();
        assert_eq!(err, DomainError::empty_field("pair_address"));
    }

    #[test]
    fn empty_token_0_is_rejected() {
        let err = Pair::new("P1", "", "B", created_at()).unwrap_err();
        assert_eq!(err, DomainError::empty_field("token_0"));
    }

    #[test]
    fn empty_token_1_is_rejected() {
        let err = Pair::new("P1", "A", "", created_at()).unwrap_err();
        assert_eq!(err, DomainError::empty_field("token_1"));
    }

    #[test]
    fn from_event_carries_the_event_timestamp() {
        let event = NewPairEvent {
            pair_address: "P1".to_string(),
            token_0: "A".to_string(),
            token_1: "B".to_string(),
            timestamp: created_at(),
        };

        let pair = Pair::from_event(&event).unwrap();
        assert_eq!(pair.created_at, event.timestamp);
        assert_eq!(pair.pair_address, "P1");
    }
}
