//! # MythTV Alexa Bridge
//!
//! Bridge core exposing MythTV frontends as Alexa smart-home endpoints.
//!
//! ## Key Features
//!
//! - **Capability Handlers**: one per Alexa namespace, from channel control to Wake-on-LAN
//! - **Directive Dispatch**: every outcome, including panics, becomes a structured response
//! - **Resulting State**: directives report the state the frontend ends up in, not a bare ack
//! - **Delta Tracking**: each event or refresh completes once all the publications it caused settle
//! - **Pluggable Collaborators**: frontend, backend and shadow transport are traits
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mythtv_alexa::prelude::*;
//!
//! mythtv_alexa::logging::init_logging_from_env()?;
//!
//! let manager = EndpointManager::new(BridgeConfig::default(), backend, publisher)?;
//! let endpoints = manager.register_frontends(vec![frontend]).await;
//!
//! let response = manager.dispatch(&endpoints[0], request).await?;
//! ```
//!
//! Device events are handed to an endpoint's router, typically through an
//! [`event_router::EventFeed`]:
//!
//! ```rust,ignore
//! let endpoint = manager.endpoint(&id).unwrap();
//! let (feed, _pump) = event_router::spawn_event_pump(endpoint.events().clone(), EventSource::Frontend);
//! ```

pub mod activity;
pub mod channels;
pub mod client;
pub mod config;
pub mod delta;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod handler;
pub mod handlers;
pub mod logging;
pub mod mac;
pub mod manager;
pub mod model;

pub use activity::FrontendActivity;
pub use channels::ChannelDirectory;
pub use client::{BackendClient, FrontendClient, ShadowPublisher};
pub use config::BridgeConfig;
pub use delta::DeltaCoordinator;
pub use dispatch::Dispatcher;
pub use endpoint::Endpoint;
pub use error::{BridgeError, ClientError, HandlerError, HandlerResult, Result};
pub use handler::CapabilityHandler;
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use mac::{ArpMacResolver, MacResolver};
pub use manager::EndpointManager;
pub use model::{ChannelInfo, FrontendStatus, Program, RecordingInfo, VideoMetadata};

pub use alexa_types;
pub use event_router;
pub use network_control;
pub use state_store;

/// Common imports for embedding the bridge
pub mod prelude {
    pub use crate::{
        BackendClient, BridgeConfig, BridgeError, CapabilityHandler, ClientError, Dispatcher,
        Endpoint, EndpointManager, FrontendClient, MacResolver, ShadowPublisher,
    };
    pub use alexa_types::{
        DeltaId, DirectiveError, DirectiveRequest, DirectiveResponse, EndpointId, ErrorKind,
        Namespace, StateSlice,
    };
    pub use event_router::{EventKind, EventSource, MythEvent};
}
