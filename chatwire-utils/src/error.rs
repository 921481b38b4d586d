//! Error types for chatwire
//!
//! Provides a unified error type used across all chatwire crates.

use std::path::PathBuf;

/// Main error type for chatwire operations
#[derive(Debug, thiserror::Error)]
pub enum ChatwireError {
    // === IO Errors ===

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    // === Connection Errors ===

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Connection refused by {addr}")]
    ConnectionRefused { addr: String },

    #[error("Connection to {addr} timed out after {millis}ms")]
    ConnectTimeout { addr: String, millis: u64 },

    #[error("Connection closed unexpectedly")]
    ConnectionClosed,

    #[error("Not connected")]
    NotConnected,

    // === Protocol Errors ===

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("No response within {millis}ms")]
    ResponseTimeout { millis: u64 },

    // === Configuration Errors ===

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    // === Provider Errors ===

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    // === Session Errors ===

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    // === Internal Errors ===

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChatwireError {
    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a provider error
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Check if this error is retryable
    ///
    /// Connect-time failures can be retried by calling `connect()` again.
    /// A response timeout leaves the connection usable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionRefused { .. }
                | Self::ConnectTimeout { .. }
                | Self::Connection(_)
                | Self::ResponseTimeout { .. }
        )
    }
}

/// Result type alias using ChatwireError
pub type Result<T> = std::result::Result<T, ChatwireError>;
