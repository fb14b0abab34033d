//! # Persistence Layer
//!
//! Repository port and storage implementations.
//!
//! ## Repository Traits (Ports)
//!
//! - [`PairRepository`]: persistence for liquidity-pair records
//!
//! ## Implementations
//!
//! - `sqlite`: the SQLite adapter used in production

pub mod sqlite;
pub mod traits;

pub use traits::{PairRepository, RepositoryError, RepositoryResult, SyncOutcome, UpsertOutcome};
