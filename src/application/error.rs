//! # Consumer Errors
//!
//! Error taxonomy for the consumer's inbound operations.
//!
//! # Error Hierarchy
//!
//! ```text
//! ConsumerError
//! ├── Configuration(String)         - store unopenable / DDL failed; fatal to initialize
//! ├── Payload(String)               - payload was not raw bytes
//! ├── Decode(EventDecodeError)      - malformed JSON or unknown event type
//! ├── Validation(DomainError)       - empty required field
//! ├── Repository(RepositoryError)   - transaction failure, rolled back
//! ├── Timeout(String)               - processing deadline exceeded
//! └── NotInitialized                - process/close ordering violation
//! ```
//!
//! Per-event errors are reported to the caller and the event is dropped;
//! nothing is retried internally. Only configuration errors are fatal, and
//! only in the sense that the consumer never becomes ready.

use crate::domain::errors::DomainError;
use crate::domain::events::EventDecodeError;
use crate::infrastructure::persistence::RepositoryError;
use thiserror::Error;

/// Error type for consumer operations.
#[derive(Debug, Error)]
pub enum ConsumerError {
    /// Initialization failed; the consumer is unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The message payload had an unexpected shape.
    #[error("payload error: {0}")]
    Payload(String),

    /// The payload could not be decoded into a known event.
    #[error(transparent)]
    Decode(#[from] EventDecodeError),

    /// The decoded event failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] DomainError),

    /// A storage operation failed; the transaction was rolled back.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Event processing exceeded its deadline.
    #[error("timeout: {0}")]
    Timeout(String),

    /// `process` was called before a successful `initialize`.
    #[error("consumer not initialized")]
    NotInitialized,
}

impl ConsumerError {
    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a payload error.
    #[must_use]
    pub fn payload(msg: impl Into<String>) -> Self {
        Self::Payload(msg.into())
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Returns true if this error prevents the consumer from becoming ready.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns true if redelivering the same event might succeed.
    ///
    /// Decode and validation failures are deterministic; only transient
    /// storage conditions are worth a caller-side retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Repository(RepositoryError::Connection(_))
        )
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type for consumer operations.
pub type ConsumerResult<T> = Result<T, ConsumerError>;
