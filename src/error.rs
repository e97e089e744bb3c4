//! Error types for the RediSearch client.
//!
//! All fallible operations return [`RediSearchError`]. Builder validation
//! failures never reach the wire, server failures are passed through exactly
//! as the `redis` crate reported them, and malformed replies surface as
//! decode errors instead of being silently truncated.
//!
//! # Examples
//!
//! ```
//! use redisearch::error::{RediSearchError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(RediSearchError::validation("need at least one reducer"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for RediSearch client operations.
#[derive(Error, Debug)]
pub enum RediSearchError {
    /// A request builder was structurally invalid (missing reducer, missing
    /// grouping field, bad alias, invalid schema field, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A constructor was handed input it cannot represent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A reply did not have the shape implied by the request flags.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Errors reported by the server or the connection.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// I/O errors (configuration files, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with RediSearchError.
pub type Result<T> = std::result::Result<T, RediSearchError>;

impl RediSearchError {
    /// Create a new validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        RediSearchError::Validation(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        RediSearchError::InvalidArgument(msg.into())
    }

    /// Create a new decode error.
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        RediSearchError::Decode(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        RediSearchError::InvalidConfig(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        RediSearchError::Other(msg.into())
    }

    /// Whether this error was produced by the server or the connection.
    pub fn is_server_error(&self) -> bool {
        matches!(self, RediSearchError::Redis(_))
    }
}
