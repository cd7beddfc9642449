//! Error types for typedkv
//!
//! Provides a unified error type for all operations. Nothing in the crate
//! catches or retries these; every error reaches the caller unchanged.
//! Absence (missing key, field or member) is never an error.

use thiserror::Error;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for typedkv operations
#[derive(Debug, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // Construction Errors
    // -------------------------------------------------------------------------
    /// A required dependency was missing when building a template, or a
    /// connection configuration is unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    /// A reply did not have the shape the issuing command expects, or the
    /// byte stream was not valid RESP.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The store answered with an error reply (e.g. `WRONGTYPE ...`).
    #[error("Server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    /// A buffer could not be parsed into the target type.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A value could not be rendered into a buffer.
    #[error("Encode error: {0}")]
    Encode(String),
}

impl KvError {
    /// Reply-shape mismatch for `command`.
    pub(crate) fn unexpected_reply(command: &str, expected: &str, got: &str) -> Self {
        KvError::Protocol(format!(
            "{}: expected {} reply, got {}",
            command, expected, got
        ))
    }
}
