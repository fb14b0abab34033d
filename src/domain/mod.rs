//! # Domain Layer
//!
//! Pure domain types for the pair consumer: event records decoded from the
//! wire, the persisted [`Pair`](pair::Pair) entity, and the validation
//! errors they can produce. Nothing in this layer performs I/O.

pub mod errors;
pub mod events;
pub mod pair;

pub use errors::{DomainError, DomainResult};
pub use events::{decode_event, EventDecodeError, NewPairEvent, PairEvent, SyncEvent};
pub use pair::Pair;
