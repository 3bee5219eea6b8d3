//! Error types for TurboPech
//!
//! This module defines the error types used throughout the client,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for TurboPech operations
///
/// Covers configuration loading, backend requests, conversation storage,
/// and user input that the command layer rejects.
#[derive(Error, Debug)]
pub enum TurboPechError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend errors (unreachable server, non-success status, bad payload)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Backend answered with a non-success HTTP status
    #[error("Backend returned {status}: {body}")]
    BackendStatus {
        /// HTTP status code returned by the backend
        status: u16,
        /// Response body text, possibly empty
        body: String,
    },

    /// Conversation storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// A conversation or model could not be found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input rejected by the command layer (out-of-range values, unknown names)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for TurboPech operations
///
/// Uses `anyhow::Error` so callers can attach context while still being able
/// to downcast to [`TurboPechError`].
pub type Result<T> = anyhow::Result<T>;
