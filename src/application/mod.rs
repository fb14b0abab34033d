//! # Application Layer
//!
//! The host-facing consumer contract and the event dispatch that wires
//! payload decoding to the persistence handlers.

pub mod consumer;
pub mod error;

pub use consumer::{Consumer, ConsumerKind, Message, Payload, SoroswapPairsConsumer};
pub use error::{ConsumerError, ConsumerResult};
