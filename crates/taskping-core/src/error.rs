// Error types for the notification pipeline

use thiserror::Error;

/// Result type alias for notification pipeline operations
pub type Result<T> = std::result::Result<T, NotifyError>;

/// Errors that can occur while queueing, delivering, or presenting notifications
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Backing store error (retryable; a failed poll must not crash the server)
    #[error("Store error: {0}")]
    Store(String),

    /// Caller is not authenticated
    #[error("Access Forbidden")]
    Forbidden,

    /// User has not enabled the push channel
    #[error("Notifications disabled")]
    ChannelDisabled,

    /// Wire payload could not be encoded or decoded
    #[error("Codec error: {0}")]
    Codec(String),

    /// Transport-level failure on the client stream
    #[error("Transport error: {0}")]
    Transport(String),

    /// Client cursor could not be read or persisted
    #[error("Cursor error: {0}")]
    Cursor(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl NotifyError {
    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        NotifyError::Store(msg.into())
    }

    /// Create a codec error
    pub fn codec(msg: impl Into<String>) -> Self {
        NotifyError::Codec(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        NotifyError::Transport(msg.into())
    }

    /// Create a cursor error
    pub fn cursor(msg: impl Into<String>) -> Self {
        NotifyError::Cursor(msg.into())
    }
}
