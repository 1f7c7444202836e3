//! Error types for redisx
//!
//! Provides a unified error type for all operations.

use std::time::Duration;

use thiserror::Error;

/// Result type alias using RedisError
pub type Result<T> = std::result::Result<T, RedisError>;

/// Unified error type for redisx operations
#[derive(Debug, Error)]
pub enum RedisError {
    // -------------------------------------------------------------------------
    // Validation Errors
    // -------------------------------------------------------------------------
    /// Caller passed an empty/blank/out-of-range argument. Raised before any I/O.
    #[error("Invalid argument `{name}`: {reason}")]
    InvalidArgument {
        name: &'static str,
        reason: &'static str,
    },

    // -------------------------------------------------------------------------
    // Marshalling Errors
    // -------------------------------------------------------------------------
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Decoding error: {0}")]
    Decoding(String),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    /// Error reply sent by the server
    #[error("Server error: {0}")]
    Server(String),

    // -------------------------------------------------------------------------
    // State Errors
    // -------------------------------------------------------------------------
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// EXEC returned a different number of replies than commands were queued
    #[error("Transaction reply count mismatch: {expected} commands queued, {actual} replies received")]
    ReplyCountMismatch { expected: usize, actual: usize },

    // -------------------------------------------------------------------------
    // Blocking Facade Errors
    // -------------------------------------------------------------------------
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RedisError {
    /// Shorthand used by decoders when a reply has an unexpected shape
    pub(crate) fn unexpected(expected: &str, actual: &str) -> Self {
        RedisError::Decoding(format!("expected {}, got {}", expected, actual))
    }

    /// True when the error is a server error reply
    pub fn is_server_error(&self) -> bool {
        matches!(self, RedisError::Server(_))
    }
}
