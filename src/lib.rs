//! # Soroswap Pairs Consumer
//!
//! An event consumer that durably persists Soroswap liquidity-pair state
//! (pair creation and reserve-sync events) into SQLite with idempotent
//! writes and crash-consistent transactions.
//!
//! The hosting dispatcher delivers one event payload at a time through the
//! [`Consumer`] contract; the payload is decoded into a typed event and
//! routed to the matching write handler, each of which runs inside a single
//! bounded-duration transaction.
//!
//! # Architecture
//!
//! - [`domain`]: pure event and entity types, no I/O
//! - [`application`]: the consumer contract and event dispatch
//! - [`infrastructure`]: the SQLite persistence adapter
//!
//! # Examples
//!
//! ```no_run
//! use serde_json::{Map, Value};
//! use soroswap_pairs::{Consumer, Message, SoroswapPairsConsumer};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut consumer = SoroswapPairsConsumer::new();
//!
//! let mut config = Map::new();
//! config.insert("db_path".to_string(), Value::from("soroswap_pairs.sqlite"));
//! consumer.initialize(&config).await?;
//!
//! let payload = br#"{"type":"new_pair","pair_address":"CAIR...",
//!     "token_0":"CAAA...","token_1":"CBBB...",
//!     "timestamp":"2024-01-01T00:00:00Z"}"#;
//! consumer.process(&Message::from_bytes(payload.to_vec())).await?;
//!
//! consumer.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::consumer::{
    Consumer, ConsumerKind, Message, Payload, SoroswapPairsConsumer, DEFAULT_DB_PATH,
};
pub use application::error::{ConsumerError, ConsumerResult};
pub use domain::events::{decode_event, EventDecodeError, NewPairEvent, PairEvent, SyncEvent};
pub use domain::pair::Pair;
pub use infrastructure::persistence::sqlite::SqlitePairStore;
pub use infrastructure::persistence::{
    PairRepository, RepositoryError, RepositoryResult, SyncOutcome, UpsertOutcome,
};
