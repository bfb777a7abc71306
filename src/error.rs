//! Error types for factum
//!
//! Absence is never an error: unmatched queries return empty results,
//! cardinality 0, or `false`. The error type covers configuration and
//! construction problems only.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FactumError>;

/// Errors produced while configuring or driving a [`crate::FactStore`].
#[derive(Debug, Error)]
pub enum FactumError {
    /// The configured index backend cannot serve queries.
    #[error("index backend '{0}' is not supported")]
    UnsupportedBackend(String),

    /// A relation name failed validation.
    #[error("invalid relation name: {0}")]
    InvalidRelationName(String),

    /// Configuration could not be parsed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
