//! # SQLite Persistence
//!
//! SQLite implementations of the persistence ports.

pub mod pair_store;

pub use pair_store::SqlitePairStore;
