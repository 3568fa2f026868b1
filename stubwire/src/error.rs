//! Error types for stubwire.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::session::Status;

/// Main error type for stubwire operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Framing and payload decoding errors
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Vector lookup and rendering errors
    #[error("Vector error: {0}")]
    Vector(#[from] VectorError),

    /// Session state errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Invalid configuration in the channel builder
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl Error {
    /// Whether the failure was a network fault that may succeed on retry.
    ///
    /// A retryable fault says nothing about the target's capabilities, so
    /// callers should not record it as a failed probe.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Transport(TransportError::Request(_) | TransportError::Timeout(_))
        )
    }

    /// Whether a matched response failed to decode.
    ///
    /// This usually means a wrong password or an incompatible stub, as
    /// opposed to a target that produced no output at all.
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            Error::Codec(CodecError::Base64(_) | CodecError::Decompress(_))
        )
    }
}

/// Transport layer errors (HTTP exchange, client setup).
#[derive(Error, Debug)]
pub enum TransportError {
    /// The target URL could not be parsed
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// A configured header name or value is not valid HTTP
    #[error("Invalid header '{name}'")]
    InvalidHeader { name: String },

    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),

    /// The request failed or the exchange was aborted
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// Operation timed out
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The user agent list could not be read
    #[error("Failed to load user agents from '{path}': {source}")]
    AgentPool {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Payload encoding errors.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Compression of an outgoing payload failed
    #[error("Compression failed: {0}")]
    Compress(#[source] io::Error),

    /// The captured payload is not valid base64
    #[error("Base64 decoding failed: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The de-obfuscated payload is not a valid zlib stream
    #[error("Decompression failed: {0}")]
    Decompress(#[source] io::Error),

    /// Marker pattern failed to compile
    #[error("Invalid marker pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Vector registry errors.
#[derive(Error, Debug)]
pub enum VectorError {
    /// No vector registered under this name
    #[error("Unknown vector '{name}'")]
    Unknown { name: String },

    /// A vector with this name is already registered
    #[error("Vector '{name}' is already registered")]
    AlreadyRegistered { name: String },

    /// Template contains an unterminated or empty placeholder
    #[error("Invalid template placeholder at byte {position}")]
    InvalidTemplate { position: usize },

    /// Template references an argument the caller did not supply
    #[error("Vector '{vector}' requires argument '{argument}'")]
    MissingArgument { vector: String, argument: String },
}

/// Session errors.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The module's capability was not negotiated successfully
    #[error("Module '{module}' is not ready (status: {status})")]
    NotReady { module: String, status: Status },

    /// Session entry is RUN but holds no pinned vector
    #[error("Module '{module}' has no pinned vector")]
    NoPinnedVector { module: String },

    /// Session file I/O error
    #[error("Session I/O error: {0}")]
    Io(#[from] io::Error),

    /// Session file is not valid JSON
    #[error("Session format error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using stubwire's Error.
pub type Result<T> = std::result::Result<T, Error>;
