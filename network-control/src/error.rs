//! Error types for the network control client

use thiserror::Error;

/// Errors that can occur talking to the network control socket
#[derive(Debug, Error)]
pub enum NetworkControlError {
    /// TCP connection could not be established
    #[error("Failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Read or write failed mid-exchange
    #[error("Network control I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Frontend answered `ERROR`; carries the raw response text
    #[error("{0}")]
    Rejected(String),

    /// Socket closed before an `OK` or `ERROR` line arrived
    #[error("Connection closed before a response was received")]
    Closed,

    /// No response within the configured timeout
    #[error("Timed out after {0:?} waiting for a response")]
    Timeout(std::time::Duration),
}

/// Result type for network control operations
pub type Result<T> = std::result::Result<T, NetworkControlError>;
