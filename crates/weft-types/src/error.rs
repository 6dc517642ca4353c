//! Error types for the foundation types.

use thiserror::Error;

/// Errors from constructing or parsing foundation types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    /// A hex string could not be decoded.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// A decoded value had the wrong byte length.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// A component id string is malformed.
    #[error("invalid component id '{id}': {reason}")]
    InvalidComponentId { id: String, reason: String },

    /// A lane name is malformed.
    #[error("invalid lane name '{name}': {reason}")]
    InvalidLaneName { name: String, reason: String },
}
