use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Classification of a failed directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Requested channel or content could not be resolved
    NotSubscribed,

    /// Operation is invalid for the device's current mode
    NotSupportedInCurrentMode,

    /// A state-change wait timed out or an unexpected failure was wrapped
    EndpointBusy,

    /// Unknown namespace, unknown operation or malformed payload
    InvalidDirective,
}

impl ErrorKind {
    /// Wire error type, e.g. `NOT_SUBSCRIBED`
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotSubscribed => "NOT_SUBSCRIBED",
            ErrorKind::NotSupportedInCurrentMode => "NOT_SUPPORTED_IN_CURRENT_MODE",
            ErrorKind::EndpointBusy => "ENDPOINT_BUSY",
            ErrorKind::InvalidDirective => "INVALID_DIRECTIVE",
        }
    }

    /// Interface namespace the error type belongs to
    pub fn error_namespace(&self) -> &'static str {
        match self {
            ErrorKind::NotSubscribed => "Alexa.Video",
            _ => "Alexa",
        }
    }
}

/// Structured, protocol-facing directive failure
///
/// Serializes as `{errorType, errorPayload: {type, message}}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {message}", kind.as_str())]
pub struct DirectiveError {
    pub kind: ErrorKind,
    pub message: String,
}

impl DirectiveError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_subscribed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotSubscribed, message)
    }

    pub fn not_supported_in_current_mode(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotSupportedInCurrentMode, message)
    }

    pub fn endpoint_busy(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EndpointBusy, message)
    }

    pub fn invalid_directive(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidDirective, message)
    }
}

impl Serialize for DirectiveError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Payload<'a>(&'a DirectiveError);

        impl Serialize for Payload<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut s = serializer.serialize_struct("ErrorPayload", 2)?;
                s.serialize_field("type", self.0.kind.as_str())?;
                s.serialize_field("message", &self.0.message)?;
                s.end()
            }
        }

        let mut s = serializer.serialize_struct("DirectiveError", 2)?;
        s.serialize_field("errorType", self.kind.error_namespace())?;
        s.serialize_field("errorPayload", &Payload(self))?;
        s.end()
    }
}
