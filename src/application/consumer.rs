//! # Consumer Contract
//!
//! The abstract capability set a hosting dispatcher uses to drive a
//! consumer — identity, initialize, process, close — and the concrete
//! [`SoroswapPairsConsumer`] that persists pair events into SQLite.
//!
//! The host discovers and invokes consumers only through the [`Consumer`]
//! trait; host internals are not modeled here.
//!
//! # Examples
//!
//! ```no_run
//! use serde_json::Map;
//! use soroswap_pairs::application::consumer::{Consumer, Message, SoroswapPairsConsumer};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut consumer = SoroswapPairsConsumer::new();
//! consumer.initialize(&Map::new()).await?;
//!
//! let payload = br#"{"type":"sync","contract_id":"P1","new_reserve_0":"100",
//!     "new_reserve_1":"50","timestamp":"2024-01-01T01:00:00Z","ledger_sequence":42}"#;
//! consumer.process(&Message::from_bytes(payload.to_vec())).await?;
//! # Ok(())
//! # }
//! ```

use crate::application::error::{ConsumerError, ConsumerResult};
use crate::domain::events::{decode_event, PairEvent};
use crate::domain::pair::Pair;
use crate::infrastructure::persistence::sqlite::SqlitePairStore;
use crate::infrastructure::persistence::{PairRepository, SyncOutcome, UpsertOutcome};
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Default storage location when the config omits `db_path`.
pub const DEFAULT_DB_PATH: &str = "soroswap_pairs.sqlite";

/// Deadline for processing a single event, transaction included.
const PROCESS_DEADLINE: Duration = Duration::from_secs(30);

/// Kind of plugin a component registers as with the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerKind {
    /// A terminal event consumer.
    Consumer,
}

impl fmt::Display for ConsumerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Consumer => write!(f, "consumer"),
        }
    }
}

/// Opaque payload shapes a host may deliver.
///
/// This consumer only accepts [`Payload::Bytes`]; any other shape is a
/// per-event payload error.
#[derive(Debug, Clone)]
pub enum Payload {
    /// Raw bytes, expected to contain one JSON object.
    Bytes(Bytes),
    /// An already-decoded string.
    Text(String),
    /// An already-parsed JSON value.
    Json(Value),
}

impl Payload {
    /// Returns a short name for the payload shape, for error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bytes(_) => "bytes",
            Self::Text(_) => "text",
            Self::Json(_) => "json",
        }
    }
}

/// A message delivered by the host dispatcher.
#[derive(Debug, Clone)]
pub struct Message {
    /// The opaque event payload.
    pub payload: Payload,
}

impl Message {
    /// Creates a message with the given payload.
    #[must_use]
    pub fn new(payload: Payload) -> Self {
        Self { payload }
    }

    /// Creates a message carrying a raw bytes payload.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self::new(Payload::Bytes(bytes.into()))
    }
}

/// Contract between the host dispatcher and a consumer.
///
/// The host calls [`initialize`](Consumer::initialize) once, then
/// [`process`](Consumer::process) one event at a time, and finally
/// [`close`](Consumer::close). `close` must be safe to call at any point,
/// including before `initialize` and more than once.
#[async_trait]
pub trait Consumer: Send + Sync {
    /// Returns the consumer's registered name.
    fn name(&self) -> &str;

    /// Returns the consumer's version.
    fn version(&self) -> &str;

    /// Returns the kind of plugin this is.
    fn kind(&self) -> ConsumerKind;

    /// Prepares the consumer for processing.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerError::Configuration`] if the backing store cannot
    /// be opened, configured, or schema-initialized. The consumer stays
    /// unusable after a failed initialize.
    async fn initialize(&mut self, config: &Map<String, Value>) -> ConsumerResult<()>;

    /// Processes one event message.
    ///
    /// Never panics on malformed input; all failures are reported as
    /// errors and the event is dropped.
    ///
    /// # Errors
    ///
    /// Returns a per-event [`ConsumerError`] for payload-shape, decoding,
    /// validation, storage, or deadline failures.
    async fn process(&self, message: &Message) -> ConsumerResult<()>;

    /// Releases the consumer's resources.
    ///
    /// Idempotent: safe to call repeatedly and before `initialize`.
    ///
    /// # Errors
    ///
    /// Implementations that hold flushable resources may report a failure
    /// to release them.
    async fn close(&mut self) -> ConsumerResult<()>;
}

/// Consumer that persists Soroswap pair events into SQLite.
///
/// Recognized configuration:
///
/// - `db_path` (string): storage location, defaulting to
///   [`DEFAULT_DB_PATH`]. A non-string value falls back to the default.
#[derive(Debug, Default)]
pub struct SoroswapPairsConsumer {
    store: Option<SqlitePairStore>,
}

impl SoroswapPairsConsumer {
    /// Creates an uninitialized consumer.
    #[must_use]
    pub fn new() -> Self {
        Self { store: None }
    }

    /// Returns the backing store, if initialized.
    #[must_use]
    pub fn store(&self) -> Option<&SqlitePairStore> {
        self.store.as_ref()
    }

    /// Resolves the storage path from the host configuration.
    fn db_path(config: &Map<String, Value>) -> String {
        config
            .get("db_path")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_DB_PATH)
            .to_string()
    }

    /// Routes a decoded event to its write handler.
    async fn dispatch(store: &SqlitePairStore, event: PairEvent) -> ConsumerResult<()> {
        match event {
            PairEvent::NewPair(event) => {
                let pair = Pair::from_event(&event)?;
                match store.insert(&pair).await? {
                    UpsertOutcome::Inserted => {
                        info!(
                            pair_address = %pair.pair_address,
                            token_0 = %pair.token_0,
                            token_1 = %pair.token_1,
                            "inserted new pair"
                        );
                    }
                    UpsertOutcome::AlreadyExists => {
                        debug!(
                            pair_address = %pair.pair_address,
                            "duplicate new_pair event ignored"
                        );
                    }
                }
                Ok(())
            }
            PairEvent::Sync(event) => {
                match store.apply_sync(&event).await? {
                    SyncOutcome::Applied => {
                        info!(
                            pair_address = %event.contract_id,
                            ledger = event.ledger_sequence,
                            "updated pair reserves"
                        );
                    }
                    SyncOutcome::UnknownPair => {
                        // Tolerated anomaly: the event is acknowledged
                        // with zero effect.
                        warn!(
                            pair_address = %event.contract_id,
                            "received sync event for unknown pair"
                        );
                    }
                }
                Ok(())
            }
        }
    }
}

#[async_trait]
impl Consumer for SoroswapPairsConsumer {
    fn name(&self) -> &str {
        "soroswap-pairs-sqlite"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn kind(&self) -> ConsumerKind {
        ConsumerKind::Consumer
    }

    async fn initialize(&mut self, config: &Map<String, Value>) -> ConsumerResult<()> {
        let path = Self::db_path(config);

        let store = SqlitePairStore::open(&path).await.map_err(|e| {
            ConsumerError::configuration(format!("failed to open pair store at {path}: {e}"))
        })?;

        self.store = Some(store);
        info!(db_path = %path, "consumer initialized");
        Ok(())
    }

    async fn process(&self, message: &Message) -> ConsumerResult<()> {
        let store = self.store.as_ref().ok_or(ConsumerError::NotInitialized)?;

        let bytes = match &message.payload {
            Payload::Bytes(bytes) => bytes,
            other => {
                return Err(ConsumerError::payload(format!(
                    "expected raw bytes payload, got {}",
                    other.kind()
                )));
            }
        };

        let event = decode_event(bytes)?;
        debug!(event_type = event.event_type(), "processing event");

        // The handler cooperates with cancellation: dropping the dispatch
        // future rolls back any in-flight transaction.
        timeout(PROCESS_DEADLINE, Self::dispatch(store, event))
            .await
            .map_err(|_| {
                ConsumerError::timeout(format!(
                    "event processing exceeded {}s deadline",
                    PROCESS_DEADLINE.as_secs()
                ))
            })?
    }

    async fn close(&mut self) -> ConsumerResult<()> {
        if let Some(store) = self.store.take() {
            store.close().await;
            info!("pair store closed");
        }
        Ok(())
    }
}
