//! Error types for agentkv
//!
//! This module defines the error hierarchy shared by every layer of the
//! workspace. We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! ## Severity
//!
//! Only store-level failures abort an aggregation pass. Encoding, decoding and
//! malformed-key errors are scoped to the single operation or key that raised
//! them; see [`Error::is_fatal`].

use std::io;
use thiserror::Error;

/// Result type alias for agentkv operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the typed store layer
#[derive(Debug, Error)]
pub enum Error {
    /// Payload could not be marshaled into bytes
    #[error("Encode error: {0}")]
    Encode(String),

    /// Stored bytes could not be unmarshaled into the requested shape
    #[error("Decode error for key '{key}': {message}")]
    Decode {
        /// Key whose value failed to decode (empty when unknown)
        key: String,
        /// Serializer message
        message: String,
    },

    /// The underlying byte store failed or is unavailable
    #[error("Store error: {0}")]
    Store(String),

    /// The store connection has been closed
    #[error("Store connection closed")]
    Closed,

    /// A key lacked the parameters its record type requires
    #[error("Malformed key '{key}': {reason}")]
    MalformedKey {
        /// Offending key
        key: String,
        /// Why the key was rejected
        reason: String,
    },

    /// Invalid operation or state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Configuration could not be loaded or validated
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error (config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Build a decode error that is not yet attributed to a key
    pub fn decode(message: impl Into<String>) -> Self {
        Error::Decode {
            key: String::new(),
            message: message.into(),
        }
    }

    /// Attach the originating key to a decode error
    ///
    /// Other variants are returned unchanged.
    pub fn with_key(self, key: &str) -> Self {
        match self {
            Error::Decode { message, .. } => Error::Decode {
                key: key.to_string(),
                message,
            },
            other => other,
        }
    }

    /// Build a store error
    pub fn store(message: impl Into<String>) -> Self {
        Error::Store(message.into())
    }

    /// Whether further reads from the same store can still be trusted
    ///
    /// Store failures (including a closed connection) are fatal to an
    /// aggregation pass; everything else only degrades a single record.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Store(_) | Error::Closed | Error::Io(_))
    }

    /// Whether this is a decode failure
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode { .. })
    }
}

impl From<rmp_serde::encode::Error> for Error {
    fn from(e: rmp_serde::encode::Error) -> Self {
        Error::Encode(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for Error {
    fn from(e: rmp_serde::decode::Error) -> Self {
        Error::decode(e.to_string())
    }
}
