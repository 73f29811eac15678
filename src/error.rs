//! Error types for notification registration and inbound decoding.

use crate::types::{ConnectionId, ValueKind};
use thiserror::Error;

/// Main error type for registry operations.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// First argument was neither a name nor a mapping of names to handlers.
    #[error("Subsciptions is not a mapping of names to handlers")]
    NotAMapping { got: ValueKind },

    #[error("Expected function as notification handler, got {got}")]
    NotCallable { got: ValueKind },

    #[error("Given notification name is empty")]
    EmptyName,

    #[error("Notifications with prefix \"rpc.\" is for internal usage only")]
    ReservedPrefix { name: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Connection closed: {0}")]
    ConnectionClosed(ConnectionId),
}

/// Coarse classification of a [`NotifyError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    TypeMismatch,
    EmptyName,
    ReservedPrefix,
    Parse,
    InvalidMessage,
    Config,
    ConnectionClosed,
}

impl NotifyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NotifyError::NotAMapping { .. } | NotifyError::NotCallable { .. } => {
                ErrorKind::TypeMismatch
            }
            NotifyError::EmptyName => ErrorKind::EmptyName,
            NotifyError::ReservedPrefix { .. } => ErrorKind::ReservedPrefix,
            NotifyError::Parse(_) => ErrorKind::Parse,
            NotifyError::InvalidMessage(_) => ErrorKind::InvalidMessage,
            NotifyError::Config(_) => ErrorKind::Config,
            NotifyError::ConnectionClosed(_) => ErrorKind::ConnectionClosed,
        }
    }
}

impl From<serde_json::Error> for NotifyError {
    fn from(e: serde_json::Error) -> Self {
        NotifyError::Parse(e.to_string())
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, NotifyError>;
