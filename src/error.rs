//! Error types for NestDB
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using NestError
pub type Result<T> = std::result::Result<T, NestError>;

/// Unified error type for NestDB operations
#[derive(Debug, Error)]
pub enum NestError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Payload / Query Errors
    // -------------------------------------------------------------------------
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Storage error: {0}")]
    Storage(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Identifier Errors
    // -------------------------------------------------------------------------
    #[error("{0} name cannot be empty")]
    EmptyIdentifier(&'static str),

    #[error("Invalid name: {0}")]
    InvalidIdentifier(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl NestError {
    /// True when the error means the peer is gone (EOF, reset, broken pipe).
    ///
    /// Sessions end quietly on these instead of reporting them.
    pub fn is_disconnect(&self) -> bool {
        match self {
            NestError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }

    /// True for failures of the byte stream itself, which end a session.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            NestError::Io(_) | NestError::Network(_) | NestError::Protocol(_)
        )
    }
}
