use thiserror::Error;

/// Errors that can occur while routing device events
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// Event type outside the known vocabulary
    #[error("Unknown event kind: {0}")]
    UnknownEventKind(String),

    /// Event stream closed
    #[error("Event channel has been closed")]
    ChannelClosed,
}

/// Result type for event router operations
pub type Result<T> = std::result::Result<T, RouterError>;
