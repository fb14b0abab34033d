//! # Infrastructure Layer
//!
//! Persistence adapters for the pair consumer.

pub mod persistence;
