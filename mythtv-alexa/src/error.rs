use alexa_types::{DirectiveError, EndpointId};
use network_control::NetworkControlError;
use thiserror::Error;

use crate::logging::LoggingError;

/// Transport-level failure reported by a collaborator
///
/// Handlers pass these through unchanged; only the dispatcher turns them
/// into a protocol error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Frontend request failed: {0}")]
    Frontend(String),

    #[error("Backend request failed: {0}")]
    Backend(String),

    #[error("Shadow publish failed: {0}")]
    Publish(String),

    #[error("MAC lookup failed: {0}")]
    MacLookup(String),
}

/// Failure of a capability handler operation
#[derive(Error, Debug)]
pub enum HandlerError {
    /// Already structured; reaches the caller as-is
    #[error(transparent)]
    Directive(#[from] DirectiveError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    NetworkControl(#[from] NetworkControlError),

    /// Handler task panicked or was cancelled
    #[error("{0}")]
    Internal(String),
}

impl HandlerError {
    /// Convert to the protocol error sent back to the caller
    ///
    /// Anything not already structured becomes `EndpointBusy` with the
    /// original message.
    pub fn into_directive_error(self) -> DirectiveError {
        match self {
            HandlerError::Directive(err) => err,
            other => DirectiveError::endpoint_busy(other.to_string()),
        }
    }
}

/// Errors from endpoint setup and lifecycle
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    #[error("Endpoint already registered: {0}")]
    DuplicateEndpoint(EndpointId),

    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(EndpointId),

    #[error("Invalid value {value:?} for setting {key}")]
    InvalidSetting { key: String, value: String },
}

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Result type for handler operations
pub type HandlerResult<T> = std::result::Result<T, HandlerError>;
