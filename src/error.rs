//! Error types for TagKV
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using TagError
pub type Result<T> = std::result::Result<T, TagError>;

/// Unified error type for TagKV operations
#[derive(Debug, Error)]
pub enum TagError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the stream cleanly between two messages.
    #[error("Peer disconnected")]
    Disconnected,

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    /// Malformed bytes on the wire (bad tag, length, count, or limit exceeded).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A message that has no wire representation.
    #[error("Encode error: {0}")]
    Encode(String),

    // -------------------------------------------------------------------------
    // Command Errors
    // -------------------------------------------------------------------------
    /// Well-formed request the dispatcher refused to run.
    #[error("Command error: {0}")]
    Command(String),

    /// Error reply received from the server (client side).
    #[error("Server replied with error: {0}")]
    Reply(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TagError {
    /// True when the error means the peer is gone rather than misbehaving.
    pub fn is_disconnect(&self) -> bool {
        match self {
            TagError::Disconnected => true,
            TagError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}
