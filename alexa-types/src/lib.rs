//! Shared types for the MythTV Alexa bridge
//!
//! Capability namespaces, directive envelopes, typed operation payloads,
//! reported state values and the structured error taxonomy. Every other crate
//! in the workspace speaks in these types.

pub mod capability;
pub mod delta;
pub mod directive;
pub mod endpoint;
pub mod error;
pub mod namespace;
pub mod state;

pub use capability::CapabilityDescriptor;
pub use delta::DeltaId;
pub use directive::{DirectiveRequest, DirectiveResponse, HandlerResponse, Key};
pub use endpoint::{EndpointId, EndpointInfo};
pub use error::{DirectiveError, ErrorKind};
pub use namespace::Namespace;
pub use state::{
    ChannelState, Connectivity, PlaybackState, PowerState, RecordingState, StateSlice, StateUpdate,
};
