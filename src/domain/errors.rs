//! # Domain Errors
//!
//! Validation errors for domain types.

use thiserror::Error;

/// Error type for domain validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A required string field was empty.
    #[error("invalid pair event data: {field} must not be empty")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },
}

impl DomainError {
    /// Creates an empty field error.
    #[must_use]
    pub fn empty_field(field: &'static str) -> Self {
        Self::EmptyField { field }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
