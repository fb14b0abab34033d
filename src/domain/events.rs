//! # Pair Events
//!
//! Typed records for the two event shapes the consumer accepts, and the
//! two-phase decoder that turns a raw JSON payload into one of them.
//!
//! Decoding probes the `type` discriminator field first, then fully
//! deserializes into exactly one variant of the closed [`PairEvent`] set.
//! Unrecognized discriminators and malformed payloads are rejected; no
//! partial record is ever produced.
//!
//! # Examples
//!
//! ```
//! use soroswap_pairs::domain::events::{decode_event, PairEvent};
//!
//! let payload = br#"{"type":"new_pair","pair_address":"P1","token_0":"A",
//!     "token_1":"B","timestamp":"2024-01-01T00:00:00Z"}"#;
//!
//! let event = decode_event(payload).unwrap();
//! assert!(matches!(event, PairEvent::NewPair(_)));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Event emitted when a new liquidity pair is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPairEvent {
    /// Contract address identifying the pair.
    pub pair_address: String,
    /// First token in the pair.
    pub token_0: String,
    /// Second token in the pair.
    pub token_1: String,
    /// When the pair was created on-chain.
    pub timestamp: DateTime<Utc>,
}

impl NewPairEvent {
    /// Wire discriminator for this event.
    pub const TYPE: &'static str = "new_pair";
}

/// Event emitted when a pair's reserves change.
///
/// Reserve values are decimal-as-string and passed through opaquely;
/// this component does not parse or validate them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncEvent {
    /// Contract address of the pair being synced.
    pub contract_id: String,
    /// New reserve of the first token.
    pub new_reserve_0: String,
    /// New reserve of the second token.
    pub new_reserve_1: String,
    /// When the sync occurred on-chain.
    pub timestamp: DateTime<Utc>,
    /// Ledger the sync event originated from.
    pub ledger_sequence: i64,
}

impl SyncEvent {
    /// Wire discriminator for this event.
    pub const TYPE: &'static str = "sync";
}

/// Closed set of events the consumer accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairEvent {
    /// A new pair was created.
    NewPair(NewPairEvent),
    /// An existing pair's reserves changed.
    Sync(SyncEvent),
}

impl PairEvent {
    /// Returns the wire discriminator of this event.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::NewPair(_) => NewPairEvent::TYPE,
            Self::Sync(_) => SyncEvent::TYPE,
        }
    }
}

/// Error type for payload decoding failures.
///
/// All variants are non-retriable: the payload is malformed or unrecognized
/// and redelivering it would fail the same way.
#[derive(Debug, Error)]
pub enum EventDecodeError {
    /// The `type` discriminator could not be extracted.
    #[error("error decoding event type: {0}")]
    Envelope(#[source] serde_json::Error),

    /// The discriminator matched but the full record did not deserialize.
    #[error("error decoding {event_type} event: {source}")]
    Record {
        /// Discriminator of the event being decoded.
        event_type: &'static str,
        /// Underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// The discriminator is not part of the accepted event set.
    #[error("unknown event type: {0}")]
    UnknownType(String),
}

impl EventDecodeError {
    /// Returns true if the payload carried an unrecognized discriminator.
    #[must_use]
    pub fn is_unknown_type(&self) -> bool {
        matches!(self, Self::UnknownType(_))
    }
}

/// Discriminator-only view of a payload, used for the first decode phase.
#[derive(Debug, Deserialize)]
struct TypeProbe {
    #[serde(rename = "type")]
    event_type: String,
}

/// Decodes a raw JSON payload into a [`PairEvent`].
///
/// Performs a two-phase decode: the `type` discriminator is extracted first,
/// then the full record is deserialized based on its value.
///
/// # Errors
///
/// Returns [`EventDecodeError`] if the payload is not valid JSON, the
/// discriminator is missing or unrecognized, or the full record fails to
/// deserialize.
pub fn decode_event(payload: &[u8]) -> Result<PairEvent, EventDecodeError> {
    let probe: TypeProbe = serde_json::from_slice(payload).map_err(EventDecodeError::Envelope)?;

    match probe.event_type.as_str() {
        NewPairEvent::TYPE => serde_json::from_slice(payload)
            .map(PairEvent::NewPair)
            .map_err(|source| EventDecodeError::Record {
                event_type: NewPairEvent::TYPE,
                source,
            }),
        SyncEvent::TYPE => serde_json::from_slice(payload)
            .map(PairEvent::Sync)
            .map_err(|source| EventDecodeError::Record {
                event_type: SyncEvent::TYPE,
                source,
            }),
        other => Err(EventDecodeError::UnknownType(other.to_string())),
    }
}
